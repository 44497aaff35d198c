use crate::error::{Error, Result};
use crate::{Matrix, Vector, check_non_empty};
use ndarray::ArrayView1;

/// Distance used for neighbourhood queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    pub fn distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
        match self {
            Metric::Euclidean => squared_euclidean(a, b).sqrt(),
            Metric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

#[inline]
pub(crate) fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Indices of every row within `eps` of row `point_idx`, the row itself included,
/// in ascending order. Brute force, O(n) per query.
pub(crate) fn region_query(x: &Matrix, point_idx: usize, eps: f64, metric: Metric) -> Vec<usize> {
    let point = x.row(point_idx);
    x.rows()
        .into_iter()
        .enumerate()
        .filter(|(_, other)| metric.distance(&point, other) <= eps)
        .map(|(i, _)| i)
        .collect()
}

/// Sorted k-distance curve for choosing DBSCAN's `eps`.
///
/// For each point, the Euclidean distance to its `k`-th nearest point, where the
/// point itself counts as the first neighbour (so `k = 1` yields all zeros). The
/// result is sorted ascending; the "knee" of the curve is a good `eps` for
/// `min_samples = k`.
pub fn k_distances(x: &Matrix, k: usize) -> Result<Vector> {
    check_non_empty(x)?;
    if k == 0 {
        return Err(Error::invalid("k", "must be at least 1"));
    }
    if k > x.nrows() {
        return Err(Error::invalid(
            "k",
            format!("must be <= n_samples ({}), got {}", x.nrows(), k),
        ));
    }

    let mut kth: Vec<f64> = x
        .rows()
        .into_iter()
        .map(|point| {
            let mut distances: Vec<f64> = x
                .rows()
                .into_iter()
                .map(|other| squared_euclidean(&point, &other))
                .collect();
            distances.select_nth_unstable_by(k - 1, f64::total_cmp);
            distances[k - 1].sqrt()
        })
        .collect();
    kth.sort_by(f64::total_cmp);

    Ok(Vector::from(kth))
}
