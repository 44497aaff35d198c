use super::neighbors::squared_euclidean;
use crate::error::{Error, Result};
use crate::{Matrix, check_non_empty};
use ndarray::{Array1, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Iterations between two centroid-movement checks.
const CONVERGENCE_CHECK_INTERVAL: usize = 10;

/// Mini-batch k-means with k-means++ seeding and `n_init` restarts.
///
/// Every restart refines its centroids from random batches of `batch_size`
/// distinct points, moving each centroid by an exact running mean over all
/// points it has ever been assigned. The restart with the lowest inertia over
/// the full data wins.
#[derive(Clone, Debug)]
pub struct MiniBatchKMeans {
    pub cluster_centers: Option<Matrix>,
    pub labels: Option<Array1<usize>>,
    pub inertia: Option<f64>,
    /// Iterations run by the selected restart.
    pub n_iter: Option<usize>,
    pub converged: Option<bool>,
    /// Final inertia of every restart, in run order.
    pub run_inertias: Option<Vec<f64>>,
    n_clusters: usize,
    max_iter: usize,
    batch_size: usize,
    tolerance: f64,
    n_init: usize,
    random_state: Option<u64>,
}

#[derive(Debug)]
struct RunOutcome {
    centroids: Matrix,
    labels: Array1<usize>,
    inertia: f64,
    n_iter: usize,
    converged: bool,
}

impl MiniBatchKMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            converged: None,
            run_inertias: None,
            n_clusters,
            max_iter: 300,
            batch_size: 256,
            tolerance: 1e-4,
            n_init: 3,
            random_state: None,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Must not exceed the number of samples passed to `fit`.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Restart `r` is seeded with `random_state + r`.
    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    fn validate(&self, n_samples: usize) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(Error::invalid("n_clusters", "must be at least 1"));
        }
        if self.n_clusters > n_samples {
            return Err(Error::invalid(
                "n_clusters",
                format!(
                    "n_samples={} should be >= n_clusters={}",
                    n_samples, self.n_clusters
                ),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid("batch_size", "must be at least 1"));
        }
        if self.batch_size > n_samples {
            return Err(Error::invalid(
                "batch_size",
                format!(
                    "n_samples={} should be >= batch_size={}",
                    n_samples, self.batch_size
                ),
            ));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid("max_iter", "must be at least 1"));
        }
        if self.n_init == 0 {
            return Err(Error::invalid("n_init", "must be at least 1"));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(Error::invalid(
                "tolerance",
                format!("must be non-negative and finite, got {}", self.tolerance),
            ));
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        check_non_empty(x)?;
        self.validate(x.nrows())?;

        let runs: Vec<RunOutcome> = (0..self.n_init)
            .into_par_iter()
            .map(|run| {
                let mut rng = match self.random_state {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(run as u64)),
                    None => ChaCha8Rng::from_entropy(),
                };
                self.run_once(x, run, &mut rng)
            })
            .collect();

        let run_inertias: Vec<f64> = runs.iter().map(|outcome| outcome.inertia).collect();

        let mut best: Option<RunOutcome> = None;
        for (run, outcome) in runs.into_iter().enumerate() {
            if best
                .as_ref()
                .is_none_or(|current| outcome.inertia < current.inertia)
            {
                tracing::debug!(
                    run,
                    inertia = outcome.inertia,
                    converged = outcome.converged,
                    iterations = outcome.n_iter,
                    "accepting new best mini-batch k-means run"
                );
                best = Some(outcome);
            }
        }
        let best = best.ok_or_else(|| Error::invalid("n_init", "must be at least 1"))?;

        tracing::info!(
            n_clusters = self.n_clusters,
            inertia = best.inertia,
            "mini-batch k-means finished"
        );

        self.cluster_centers = Some(best.centroids);
        self.labels = Some(best.labels);
        self.inertia = Some(best.inertia);
        self.n_iter = Some(best.n_iter);
        self.converged = Some(best.converged);
        self.run_inertias = Some(run_inertias);

        Ok(())
    }

    fn run_once(&self, x: &Matrix, run: usize, rng: &mut ChaCha8Rng) -> RunOutcome {
        tracing::debug!(run = run + 1, n_init = self.n_init, "mini-batch k-means run started");

        let (n_samples, n_features) = x.dim();
        let mut centroids = seed_centroids(x, self.n_clusters, rng);
        let mut previous = centroids.clone();

        // Points absorbed by each centroid over the whole run.
        let mut counts = vec![0usize; self.n_clusters];
        let mut batch_sums = Matrix::zeros((self.n_clusters, n_features));
        let mut batch_counts = vec![0usize; self.n_clusters];

        let mut n_iter = self.max_iter;
        let mut converged = false;

        for iteration in 0..self.max_iter {
            batch_sums.fill(0.0);
            batch_counts.fill(0);

            for idx in sample(rng, n_samples, self.batch_size).iter() {
                let point = x.row(idx);
                let (cluster, _) = nearest_centroid(&point, &centroids);
                let mut sum = batch_sums.row_mut(cluster);
                sum += &point;
                batch_counts[cluster] += 1;
            }

            apply_batch_update(&mut centroids, &mut counts, &batch_sums, &batch_counts);

            if iteration % CONVERGENCE_CHECK_INTERVAL == 0 {
                let shift: f64 = centroids
                    .iter()
                    .zip(previous.iter())
                    .map(|(new, old)| (new - old) * (new - old))
                    .sum();
                tracing::debug!(
                    run = run + 1,
                    iteration = iteration + 1,
                    max_iter = self.max_iter,
                    shift,
                    "centroid shift"
                );
                if shift < self.tolerance {
                    n_iter = iteration + 1;
                    converged = true;
                    break;
                }
                previous.assign(&centroids);
            }
        }

        if converged {
            tracing::info!(run = run + 1, iteration = n_iter, "converged");
        } else {
            tracing::info!(
                run = run + 1,
                max_iter = self.max_iter,
                "max iterations reached without convergence"
            );
        }

        let (labels, inertia) = assign_all(x, &centroids);
        tracing::info!(run = run + 1, inertia, "inertia for this run");

        RunOutcome {
            centroids,
            labels,
            inertia,
            n_iter,
            converged,
        }
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Array1<usize>> {
        self.fit(x)?;
        self.labels.clone().ok_or(Error::NotFitted("MiniBatchKMeans"))
    }

    fn fitted_centers(&self, x: &Matrix) -> Result<&Matrix> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(Error::NotFitted("MiniBatchKMeans"))?;

        if x.ncols() != centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: centroids.ncols(),
                found: x.ncols(),
            });
        }
        Ok(centroids)
    }

    /// Index of the nearest fitted centroid for every row of `x`.
    pub fn predict(&self, x: &Matrix) -> Result<Array1<usize>> {
        let centroids = self.fitted_centers(x)?;
        Ok(assign_all(x, centroids).0)
    }

    /// Euclidean distance from every row of `x` to every fitted centroid.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let centroids = self.fitted_centers(x)?;

        let mut distances = Matrix::zeros((x.nrows(), centroids.nrows()));
        for (i, point) in x.rows().into_iter().enumerate() {
            for (k, centroid) in centroids.rows().into_iter().enumerate() {
                distances[[i, k]] = squared_euclidean(&point, &centroid).sqrt();
            }
        }

        Ok(distances)
    }
}

/// Picks `n_clusters` rows of `x` as initial centroids using k-means++.
///
/// The first centroid is drawn uniformly. Each further one is drawn with
/// probability proportional to its squared distance to the closest centroid
/// chosen so far, falling back to a uniform draw when every distance is zero.
pub fn kmeans_plusplus<R: Rng>(x: &Matrix, n_clusters: usize, rng: &mut R) -> Result<Matrix> {
    check_non_empty(x)?;
    if n_clusters == 0 {
        return Err(Error::invalid("n_clusters", "must be at least 1"));
    }
    if n_clusters > x.nrows() {
        return Err(Error::invalid(
            "n_clusters",
            format!(
                "n_samples={} should be >= n_clusters={}",
                x.nrows(),
                n_clusters
            ),
        ));
    }
    Ok(seed_centroids(x, n_clusters, rng))
}

fn seed_centroids<R: Rng>(x: &Matrix, n_clusters: usize, rng: &mut R) -> Matrix {
    let n_samples = x.nrows();
    let mut centroids = Matrix::zeros((n_clusters, x.ncols()));

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&x.row(first));

    // Squared distance from each point to its closest chosen centroid.
    let mut closest: Vec<f64> = x
        .rows()
        .into_iter()
        .map(|point| squared_euclidean(&point, &centroids.row(0)))
        .collect();

    for k in 1..n_clusters {
        let next = match WeightedIndex::new(closest.iter()) {
            Ok(weighted) => weighted.sample(rng),
            Err(_) => rng.gen_range(0..n_samples),
        };
        centroids.row_mut(k).assign(&x.row(next));

        let chosen = centroids.row(k);
        for (dist, point) in closest.iter_mut().zip(x.rows()) {
            *dist = dist.min(squared_euclidean(&point, &chosen));
        }
    }

    centroids
}

/// Nearest centroid and its squared distance; the lowest index wins ties.
fn nearest_centroid(point: &ArrayView1<f64>, centroids: &Matrix) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (k, centroid) in centroids.rows().into_iter().enumerate() {
        let distance = squared_euclidean(point, &centroid);
        if distance < best.1 {
            best = (k, distance);
        }
    }
    best
}

/// Labels for every row and the resulting inertia.
fn assign_all(x: &Matrix, centroids: &Matrix) -> (Array1<usize>, f64) {
    let mut labels = Array1::zeros(x.nrows());
    let mut inertia = 0.0;
    for (i, point) in x.rows().into_iter().enumerate() {
        let (cluster, distance) = nearest_centroid(&point, centroids);
        labels[i] = cluster;
        inertia += distance;
    }
    (labels, inertia)
}

/// Moves each centroid towards its batch mean with weight `assigned / counts[c]`,
/// so every centroid stays the running mean of all points it has absorbed.
/// Centroids with no batch points are left as they are.
fn apply_batch_update(
    centroids: &mut Matrix,
    counts: &mut [usize],
    batch_sums: &Matrix,
    batch_counts: &[usize],
) {
    for (cluster, &assigned) in batch_counts.iter().enumerate() {
        if assigned == 0 {
            continue;
        }
        counts[cluster] += assigned;
        let learning_rate = assigned as f64 / counts[cluster] as f64;
        let batch_mean = batch_sums.row(cluster).mapv(|v| v / assigned as f64);
        centroids
            .row_mut(cluster)
            .zip_mut_with(&batch_mean, |c, &mean| *c += (mean - *c) * learning_rate);
    }
}
