//! Clustering algorithms for unsupervised learning.
//!
//! This module provides two independent estimators:
//! - `DBSCAN`: Density-based clustering for arbitrary shaped clusters, with noise
//! - `MiniBatchKMeans`: Centroid clustering refined from random mini-batches
//!
//! plus `k_distances`, the curve usually inspected to pick DBSCAN's `eps`.
//!
//! # Examples
//!
//! ## Mini-Batch K-Means Clustering
//! ```rust
//! use labcluster::MiniBatchKMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let mut kmeans = MiniBatchKMeans::new(2).batch_size(4).random_state(42);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 6);
//!
//! // Get cluster centers
//! let centers = kmeans.cluster_centers.as_ref().unwrap();
//! println!("Cluster centers: {:?}", centers);
//!
//! // Get within-cluster sum of squares
//! let inertia = kmeans.inertia.unwrap();
//! println!("Inertia: {:.4}", inertia);
//! ```
//!
//! ## DBSCAN Clustering
//! ```rust
//! use labcluster::{DBSCAN, NOISE};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.2, 1.1],
//!     [1.1, 1.2],
//!     [8.0, 8.0],
//!     [8.1, 8.1],
//!     [8.2, 7.9],
//!     [15.0, 1.0] // Outlier
//! ];
//!
//! let mut dbscan = DBSCAN::new(1.0, 2); // eps=1.0, min_samples=2
//! let labels = dbscan.fit_predict(&x).unwrap();
//! assert_eq!(labels[6], NOISE);
//!
//! // Get number of clusters found
//! let n_clusters = dbscan.get_n_clusters().unwrap();
//! println!("Number of clusters: {}", n_clusters);
//!
//! // Get number of noise points
//! let n_noise = dbscan.get_n_noise_points().unwrap();
//! println!("Number of noise points: {}", n_noise);
//! ```

mod dbscan;
mod kmeans;
mod neighbors;

pub use dbscan::{DBSCAN, NOISE, dbscan};
pub use kmeans::{MiniBatchKMeans, kmeans_plusplus};
pub use neighbors::{Metric, k_distances};
