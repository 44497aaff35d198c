//! Clustering over dense point sets held in `ndarray` matrices.
//!
//! Two independent estimators live under [`cluster`]:
//! - [`DBSCAN`]: density-based clustering with noise detection
//! - [`MiniBatchKMeans`]: k-means++ seeded mini-batch k-means with restarts
//!
//! [`metrics`] scores a clustering against reference classes and [`dataset`]
//! generates synthetic blobs for experiments.

#![forbid(unsafe_code)]

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod metrics;

pub use cluster::{DBSCAN, Metric, MiniBatchKMeans, NOISE, dbscan, k_distances, kmeans_plusplus};
pub use dataset::Blobs;
pub use error::{Error, Result};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

/// Rejects point sets without samples or features.
pub(crate) fn check_non_empty(x: &Matrix) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(Error::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_types_work() {
        let vec = Vector::zeros(5);
        let mat = Matrix::zeros((3, 4));
        assert_eq!(vec.len(), 5);
        assert_eq!(mat.shape(), &[3, 4]);
    }

    #[test]
    fn empty_matrices_are_rejected() {
        assert_eq!(check_non_empty(&Matrix::zeros((0, 2))), Err(Error::EmptyInput));
        assert_eq!(check_non_empty(&Matrix::zeros((3, 0))), Err(Error::EmptyInput));
        assert!(check_non_empty(&Matrix::zeros((1, 1))).is_ok());
    }
}
