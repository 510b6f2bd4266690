//! Centroid-based clustering.
//!
//! ## K-means
//!
//! Assign each point to the nearest centroid, then move each centroid to the
//! mean of its points. Repeat until the centroids stop moving.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! [`Kmeans`] starts from centroids the caller supplies. Where they come from
//! matters: Lloyd's iteration only finds a local minimum near its start.
//! [`KmeansPlusPlus`] (feature `seeding`) picks a spread-out starting set.
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "seeding")]
//! # {
//! use lloyd::cluster::{Clustering, Kmeans, KmeansPlusPlus};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! // Explicit starting centroids
//! let initial = KmeansPlusPlus::new(2).with_seed(3).select(&data).unwrap();
//! let centroids = Kmeans::new(2).fit(&initial.centroids, &data).unwrap();
//! assert_eq!(centroids.len(), 2);
//!
//! // Or seed internally and get labels back
//! let labels = Kmeans::new(2).with_seed(3).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! # }
//! ```

mod accumulator;
#[cfg(feature = "seeding")]
mod init;
mod kmeans;
mod traits;

#[cfg(feature = "seeding")]
pub use init::{KmeansPlusPlus, Seeding};
pub use kmeans::{
    fit, EmptyClusterPolicy, Kmeans, KmeansFit, DEFAULT_EPSILON, DEFAULT_MAX_ITER,
};
pub use traits::Clustering;
