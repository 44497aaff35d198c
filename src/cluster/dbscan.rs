use super::neighbors::{Metric, region_query};
use crate::error::{Error, Result};
use crate::{Matrix, check_non_empty};
use ndarray::Array1;
use std::collections::{HashSet, VecDeque};

/// Label given to points not reachable from any core point.
pub const NOISE: i64 = -1;

#[derive(Clone, Debug)]
pub struct DBSCAN {
    pub labels: Option<Array1<i64>>,
    pub core_sample_indices: Option<Vec<usize>>,
    eps: f64,
    min_samples: usize,
    metric: Metric,
}

impl DBSCAN {
    /// `min_samples` counts the point itself.
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self {
            labels: None,
            core_sample_indices: None,
            eps,
            min_samples,
            metric: Metric::Euclidean,
        }
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.eps > 0.0 && self.eps.is_finite()) {
            return Err(Error::invalid(
                "eps",
                format!("must be positive and finite, got {}", self.eps),
            ));
        }
        if self.min_samples == 0 {
            return Err(Error::invalid("min_samples", "must be at least 1"));
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        check_non_empty(x)?;
        self.validate()?;

        let n_samples = x.nrows();
        let mut labels = Array1::from_elem(n_samples, NOISE);
        let mut visited = vec![false; n_samples];
        let mut core_samples = Vec::new();
        let mut cluster_id: i64 = 0;

        for i in 0..n_samples {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            let neighbors = region_query(x, i, self.eps, self.metric);
            if neighbors.len() < self.min_samples {
                // May still be claimed as a border point by a later cluster.
                labels[i] = NOISE;
                continue;
            }

            core_samples.push(i);
            self.expand_cluster(
                x,
                i,
                neighbors,
                cluster_id,
                &mut labels,
                &mut visited,
                &mut core_samples,
            );
            tracing::debug!(cluster = cluster_id, seed = i, "dbscan cluster expanded");
            cluster_id += 1;
        }

        core_samples.sort_unstable();
        let n_noise = labels.iter().filter(|&&label| label == NOISE).count();
        tracing::info!(
            clusters = cluster_id,
            noise = n_noise,
            core = core_samples.len(),
            "dbscan finished"
        );

        self.labels = Some(labels);
        self.core_sample_indices = Some(core_samples);

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_cluster(
        &self,
        x: &Matrix,
        core_idx: usize,
        neighbors: Vec<usize>,
        cluster_id: i64,
        labels: &mut Array1<i64>,
        visited: &mut [bool],
        core_samples: &mut Vec<usize>,
    ) {
        labels[core_idx] = cluster_id;

        // FIFO over a growing frontier; a point may be queued more than once.
        let mut queue = VecDeque::from(neighbors);

        while let Some(idx) = queue.pop_front() {
            if !visited[idx] {
                visited[idx] = true;

                let idx_neighbors = region_query(x, idx, self.eps, self.metric);
                if idx_neighbors.len() >= self.min_samples {
                    core_samples.push(idx);
                    queue.extend(idx_neighbors.into_iter().filter(|&nn| labels[nn] == NOISE));
                }
            }

            // First cluster to reach a border point keeps it.
            if labels[idx] == NOISE {
                labels[idx] = cluster_id;
            }
        }
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Array1<i64>> {
        self.fit(x)?;
        self.labels.clone().ok_or(Error::NotFitted("DBSCAN"))
    }

    pub fn get_n_clusters(&self) -> Option<usize> {
        self.labels.as_ref().map(|labels| {
            let unique_clusters: HashSet<i64> =
                labels.iter().copied().filter(|&label| label != NOISE).collect();
            unique_clusters.len()
        })
    }

    pub fn get_n_noise_points(&self) -> Option<usize> {
        self.labels
            .as_ref()
            .map(|labels| labels.iter().filter(|&&label| label == NOISE).count())
    }

    /// Fraction of points labelled [`NOISE`].
    pub fn noise_ratio(&self) -> Option<f64> {
        let labels = self.labels.as_ref()?;
        let n_noise = self.get_n_noise_points()?;
        Some(n_noise as f64 / labels.len() as f64)
    }

    pub fn is_core_sample(&self, sample_idx: usize) -> Option<bool> {
        self.core_sample_indices
            .as_ref()
            .map(|core_indices| core_indices.binary_search(&sample_idx).is_ok())
    }
}

/// Runs DBSCAN once with Euclidean distance and returns the labels.
pub fn dbscan(x: &Matrix, eps: f64, min_samples: usize) -> Result<Array1<i64>> {
    DBSCAN::new(eps, min_samples).fit_predict(x)
}
