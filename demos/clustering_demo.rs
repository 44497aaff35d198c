use labcluster::dataset::min_max_scale;
use labcluster::metrics::{
    adjusted_rand_score, cluster_class_mapping, fowlkes_mallows_score,
    homogeneity_completeness_v_measure, mapped_accuracy, without_noise,
};
use labcluster::{Blobs, DBSCAN, Matrix, MiniBatchKMeans, NOISE, k_distances};
use ndarray::{Array1, array};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== Clustering Algorithms Comparison ===\n");

    let (x_raw, y) = Blobs::new(array![[2.0, 2.0], [8.0, 8.0], [2.0, 8.0], [8.0, 2.0]])
        .n_samples_per_center(150)
        .std_dev(0.6)
        .random_state(42)
        .generate()?;
    let x = min_max_scale(&x_raw);

    println!("Dataset: {} samples, {} features", x.nrows(), x.ncols());
    println!("Expected: 4 natural clusters\n");

    println!("=== Mini-Batch K-Means ===");
    for &k in &[2, 4, 6, 8] {
        match run_kmeans(&x, &y, k) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("MiniBatchKMeans(k={}) failed: {}", k, e),
        }
    }

    println!("\n=== DBSCAN ===");
    let min_samples = 8;
    let curve = k_distances(&x, min_samples)?;
    let knee = curve[(curve.len() as f64 * 0.9) as usize];
    println!(
        "{}-distance curve: median {:.4}, 90th percentile {:.4}",
        min_samples,
        curve[curve.len() / 2],
        knee
    );

    for &eps in &[knee * 0.5, knee, knee * 2.0] {
        match run_dbscan(&x, &y, eps, min_samples) {
            Ok(result) => println!("DBSCAN(eps={:.4}, min_samples={}): {}", eps, min_samples, result),
            Err(e) => println!("DBSCAN(eps={:.4}, min_samples={}) failed: {}", eps, min_samples, e),
        }
    }

    println!("\n=== Detailed Analysis ===");
    let mut best_kmeans = MiniBatchKMeans::new(4).batch_size(128).random_state(42);
    let kmeans_labels = best_kmeans.fit_predict(&x)?;
    println!(
        "MiniBatchKMeans (k=4): inertia {:.4}, {} iterations",
        best_kmeans.inertia.unwrap_or(f64::NAN),
        best_kmeans.n_iter.unwrap_or(0)
    );
    for (cluster, class) in cluster_class_mapping(&y, &kmeans_labels)? {
        println!("  Cluster {} -> Blob {}", cluster, class);
    }

    let mut best_dbscan = DBSCAN::new(knee, min_samples);
    let dbscan_labels = best_dbscan.fit_predict(&x)?;
    println!(
        "\nDBSCAN (eps={:.4}): {} clusters, {} core samples",
        knee,
        best_dbscan.get_n_clusters().unwrap_or(0),
        best_dbscan.core_sample_indices.as_ref().map_or(0, Vec::len)
    );
    print_cluster_summary(&dbscan_labels);

    Ok(())
}

fn run_kmeans(x: &Matrix, y: &Array1<usize>, k: usize) -> labcluster::Result<String> {
    let mut kmeans = MiniBatchKMeans::new(k).batch_size(128).random_state(42);
    let labels = kmeans.fit_predict(x)?;
    let (h, c, v) = homogeneity_completeness_v_measure(y, &labels)?;

    Ok(format!(
        "MiniBatchKMeans(k={}): inertia {:.4}, homogeneity {:.4}, completeness {:.4}, V-measure {:.4}, ARI {:.4}",
        k,
        kmeans.inertia.unwrap_or(f64::NAN),
        h,
        c,
        v,
        adjusted_rand_score(y, &labels)?
    ))
}

fn run_dbscan(x: &Matrix, y: &Array1<usize>, eps: f64, min_samples: usize) -> labcluster::Result<String> {
    let mut dbscan = DBSCAN::new(eps, min_samples);
    let labels = dbscan.fit_predict(x)?;

    let n_clusters = dbscan.get_n_clusters().unwrap_or(0);
    let noise_ratio = dbscan.noise_ratio().unwrap_or(0.0);
    let (y_kept, labels_kept) = without_noise(y, &labels)?;
    if labels_kept.is_empty() {
        return Ok("all points are noise".to_string());
    }

    Ok(format!(
        "{} clusters, {:.2}% noise, ARI {:.4}, Fowlkes-Mallows {:.4}, accuracy {:.4}",
        n_clusters,
        noise_ratio * 100.0,
        adjusted_rand_score(&y_kept, &labels_kept)?,
        fowlkes_mallows_score(&y_kept, &labels_kept)?,
        mapped_accuracy(&y_kept, &labels_kept)?
    ))
}

fn print_cluster_summary(labels: &Array1<i64>) {
    let mut sizes: BTreeMap<i64, usize> = BTreeMap::new();
    for &label in labels {
        *sizes.entry(label).or_insert(0) += 1;
    }

    for (cluster_id, count) in sizes {
        if cluster_id == NOISE {
            println!("    Noise: {} points", count);
        } else {
            println!("    Cluster {}: {} points", cluster_id, count);
        }
    }
}
