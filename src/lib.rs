//! # lloyd
//!
//! K-means centroid fitting: given points and `k` starting centroids, iterate
//! nearest-centroid assignment and mean updates until centroid norms settle
//! or the iteration budget runs out.
//!
//! ```rust
//! let points = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
//! let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
//!
//! let centroids = lloyd::fit(&initial, &points, 2, 200, 1e-4)?;
//! assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
//! # Ok::<(), lloyd::Error>(())
//! ```
//!
//! **Default build** includes k-means++ seeding (`seeding`, pulls `rand`).
//! Without it, callers must always supply initial centroids.

pub mod cluster;
/// Error types used across `lloyd`.
pub mod error;
pub mod matrix;
pub mod metrics;


pub use cluster::{fit, Clustering, EmptyClusterPolicy, Kmeans, KmeansFit};
pub use error::{Error, Result};
pub use metrics::inertia;

#[cfg(feature = "seeding")]
pub use cluster::{KmeansPlusPlus, Seeding};
#[cfg(feature = "seeding")]
pub use metrics::{elbow, ElbowConfig, ElbowPoint};
