//! Clustering quality metrics.
//!
//! Unsupervised measures of how well a centroid set fits its points.
//!
//! | Metric | Range | Best | Notes |
//! |--------|-------|------|-------|
//! | [`inertia`] | [0, ∞) | 0 | Always falls as k grows |
//! | [`elbow`] | - | knee | Inertia over a range of k |
//!
//! # Choosing k
//!
//! Inertia alone cannot pick k: it reaches 0 at `k = n`. The elbow method
//! plots it against k and looks for the point where adding clusters stops
//! paying off.
//!
//! ```rust
//! # #[cfg(feature = "seeding")]
//! # {
//! use lloyd::metrics::{elbow, ElbowConfig};
//!
//! let data: Vec<Vec<f64>> = (0..30)
//!     .map(|i| vec![(i / 10) as f64 * 10.0 + (i % 10) as f64 * 0.01])
//!     .collect();
//!
//! let curve = elbow(&data, 1..=5, &ElbowConfig::default()).unwrap();
//! assert_eq!(curve.len(), 5);
//! // Three well-separated groups: the drop after k = 3 is tiny.
//! assert!(curve[3].inertia < curve[1].inertia);
//! # }
//! ```

use crate::error::{Error, Result};
use crate::matrix;

#[cfg(feature = "seeding")]
use crate::cluster::{Kmeans, KmeansPlusPlus, DEFAULT_EPSILON, DEFAULT_MAX_ITER};
#[cfg(feature = "seeding")]
use std::ops::RangeInclusive;

/// Within-cluster sum of squares.
///
/// ```text
/// inertia = Σᵢ min_c ||xᵢ - μ_c||²
/// ```
///
/// Each point counts against its nearest centroid, which is the same routing
/// the assignment pass uses.
pub fn inertia(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Result<f64> {
    let data = matrix::to_array(points, "points", None)?;
    if centroids.is_empty() {
        return Err(Error::EmptyInput {
            matrix: "centroids",
        });
    }
    let centroids = matrix::to_array(centroids, "centroids", Some(data.ncols()))?;

    Ok(data
        .rows()
        .into_iter()
        .map(|p| matrix::nearest(p, &centroids).1)
        .sum())
}

/// Settings for [`elbow`].
#[cfg(feature = "seeding")]
#[derive(Debug, Clone)]
pub struct ElbowConfig {
    /// Iteration budget per run.
    pub max_iter: usize,
    /// Convergence tolerance per run.
    pub epsilon: f64,
    /// Seed for k-means++; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

#[cfg(feature = "seeding")]
impl Default for ElbowConfig {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            epsilon: DEFAULT_EPSILON,
            seed: Some(0),
        }
    }
}

/// One point on the elbow curve.
#[cfg(feature = "seeding")]
#[derive(Debug, Clone, PartialEq)]
pub struct ElbowPoint {
    /// Number of clusters.
    pub k: usize,
    /// Inertia of the fitted centroids.
    pub inertia: f64,
    /// Iterations the fit took.
    pub iterations: usize,
    /// Whether the fit converged.
    pub converged: bool,
}

/// Seed, fit and score every k in `ks`.
///
/// Each k gets its own k-means++ seeding (from the same seed) followed by a
/// [`Kmeans`] run.
#[cfg(feature = "seeding")]
pub fn elbow(
    points: &[Vec<f64>],
    ks: RangeInclusive<usize>,
    config: &ElbowConfig,
) -> Result<Vec<ElbowPoint>> {
    let mut curve = Vec::new();
    for k in ks {
        let mut seeding = KmeansPlusPlus::new(k);
        if let Some(seed) = config.seed {
            seeding = seeding.with_seed(seed);
        }
        let initial = seeding.select(points)?;

        let fit = Kmeans::new(k)
            .with_max_iter(config.max_iter)
            .with_epsilon(config.epsilon)
            .fit_report(&initial.centroids, points)?;

        curve.push(ElbowPoint {
            k,
            inertia: inertia(points, &fit.centroids)?,
            iterations: fit.iterations,
            converged: fit.converged,
        });
    }
    Ok(curve)
}
