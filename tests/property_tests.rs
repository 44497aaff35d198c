use labcluster::cluster::{DBSCAN, MiniBatchKMeans, NOISE, dbscan};
use labcluster::Matrix;
use proptest::prelude::*;

fn to_matrix(rows: &[Vec<f64>]) -> Matrix {
    let dim = rows[0].len();
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Matrix::from_shape_vec((rows.len(), dim), flat).unwrap()
}

fn distance(x: &Matrix, i: usize, j: usize) -> f64 {
    x.row(i)
        .iter()
        .zip(x.row(j).iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

proptest! {
    #[test]
    fn prop_dbscan_labels_cover_points(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 1..40),
        eps in 0.1f64..5.0,
        min_samples in 1usize..6
    ) {
        let x = to_matrix(&data);
        let labels = dbscan(&x, eps, min_samples).unwrap();

        prop_assert_eq!(labels.len(), x.nrows());

        // Cluster ids are dense: every id below the largest one is used.
        prop_assert!(labels.iter().all(|&label| label >= NOISE));
        let max_label = labels.iter().copied().max().unwrap_or(NOISE);
        for id in 0..=max_label {
            prop_assert!(labels.iter().any(|&label| label == id), "cluster {} unused", id);
        }

        prop_assert_eq!(labels, dbscan(&x, eps, min_samples).unwrap());
    }

    #[test]
    fn prop_dbscan_clustered_points_have_a_close_peer(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 2..40),
        eps in 0.5f64..6.0,
        min_samples in 2usize..4
    ) {
        let x = to_matrix(&data);
        let labels = dbscan(&x, eps, min_samples).unwrap();

        for i in 0..x.nrows() {
            if labels[i] == NOISE {
                continue;
            }
            let has_peer = (0..x.nrows())
                .any(|j| j != i && labels[j] == labels[i] && distance(&x, i, j) <= eps);
            prop_assert!(has_peer, "point {} is isolated in cluster {}", i, labels[i]);
        }
    }

    #[test]
    fn prop_dbscan_min_samples_one_never_noise(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 1..40),
        eps in 0.1f64..5.0
    ) {
        let x = to_matrix(&data);
        let labels = dbscan(&x, eps, 1).unwrap();
        prop_assert!(labels.iter().all(|&label| label != NOISE));
    }

    #[test]
    fn prop_dbscan_sparse_points_are_noise(
        n in 1usize..30,
        eps in 0.1f64..3.0,
        min_samples in 2usize..6
    ) {
        // Consecutive points sit 2 * eps apart.
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64 * 2.0 * eps, 1.0]).collect();
        let x = to_matrix(&rows);

        let mut model = DBSCAN::new(eps, min_samples);
        let labels = model.fit_predict(&x).unwrap();
        prop_assert!(labels.iter().all(|&label| label == NOISE));
        prop_assert_eq!(model.get_n_clusters(), Some(0));
    }

    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 1..30),
        k in 1usize..5,
        n_init in 1usize..4,
        seed in 0u64..1000
    ) {
        prop_assume!(k <= data.len());

        let x = to_matrix(&data);
        let mut model = MiniBatchKMeans::new(k)
            .batch_size(data.len().min(8))
            .max_iter(20)
            .n_init(n_init)
            .random_state(seed);
        let labels = model.fit_predict(&x).unwrap();

        prop_assert_eq!(labels.len(), x.nrows());
        prop_assert!(labels.iter().all(|&label| label < k));
        prop_assert_eq!(model.cluster_centers.as_ref().unwrap().nrows(), k);

        let inertia = model.inertia.unwrap();
        let runs = model.run_inertias.as_ref().unwrap();
        prop_assert!(inertia >= 0.0);
        prop_assert_eq!(runs.len(), n_init);
        prop_assert!(runs.iter().all(|&run| inertia <= run));
    }
}
