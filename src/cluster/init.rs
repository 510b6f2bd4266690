//! K-means++ seeding.
//!
//! Spreads the initial centroids out before Lloyd's iteration starts:
//!
//! 1. Choose the first centroid uniformly at random
//! 2. Choose each next centroid with probability proportional to D(x)²,
//!    the squared distance from x to the nearest centroid chosen so far
//!
//! Gives an O(log k) approximation to the optimal WCSS in expectation
//! (Arthur & Vassilvitskii, 2007).

use crate::error::{Error, Result};
use crate::matrix;
use log::debug;
use ndarray::Array2;
use rand::prelude::*;

/// K-means++ centroid selection.
#[derive(Debug, Clone)]
pub struct KmeansPlusPlus {
    /// Number of centroids to pick.
    k: usize,
    /// Random seed.
    seed: Option<u64>,
}

/// Centroids picked by [`KmeansPlusPlus::select`].
#[derive(Debug, Clone, PartialEq)]
pub struct Seeding {
    /// Copies of the chosen points, in selection order.
    pub centroids: Vec<Vec<f64>>,
    /// Indices of the chosen points in the input.
    pub indices: Vec<usize>,
}

impl KmeansPlusPlus {
    /// Create a selector for `k` centroids.
    pub fn new(k: usize) -> Self {
        Self { k, seed: None }
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pick `k` rows of `points` as initial centroids.
    pub fn select(&self, points: &[Vec<f64>]) -> Result<Seeding> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }

        let data = matrix::to_array(points, "points", None)?;
        let n = data.nrows();
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let indices = self.select_indices(&data, &mut rng);
        debug!("kmeans++: selected indices {:?}", indices);

        Ok(Seeding {
            centroids: indices.iter().map(|&i| points[i].clone()).collect(),
            indices,
        })
    }

    fn select_indices(&self, data: &Array2<f64>, rng: &mut impl Rng) -> Vec<usize> {
        let n = data.nrows();
        let mut indices = Vec::with_capacity(self.k);

        let first = rng.random_range(0..n);
        indices.push(first);

        // Squared distance from each point to its nearest chosen centroid.
        let mut d2: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|p| matrix::squared_distance(p, data.row(first)))
            .collect();

        while indices.len() < self.k {
            let total: f64 = d2.iter().sum();
            let next = if total > 0.0 {
                sample_weighted(&d2, rng.random::<f64>() * total)
            } else {
                // Every point coincides with a chosen centroid.
                rng.random_range(0..n)
            };
            indices.push(next);

            let chosen = data.row(next);
            for (d, p) in d2.iter_mut().zip(data.rows()) {
                let dist = matrix::squared_distance(p, chosen);
                if dist < *d {
                    *d = dist;
                }
            }
        }

        indices
    }
}

/// First index whose cumulative weight reaches `threshold`.
///
/// Zero-weight entries are never returned while some weight is positive.
fn sample_weighted(weights: &[f64], threshold: f64) -> usize {
    let mut cumsum = 0.0;
    for (j, &w) in weights.iter().enumerate() {
        cumsum += w;
        if w > 0.0 && cumsum >= threshold {
            return j;
        }
    }
    // Rounding left cumsum just short of the threshold.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
        ]
    }

    #[test]
    fn test_seeding_deterministic_with_seed() {
        let a = KmeansPlusPlus::new(2).with_seed(42).select(&blobs()).unwrap();
        let b = KmeansPlusPlus::new(2).with_seed(42).select(&blobs()).unwrap();
        assert_eq!(a, b, "same seed should give same result");
    }

    #[test]
    fn test_seeding_centroids_are_input_rows() {
        let data = blobs();
        let s = KmeansPlusPlus::new(3).with_seed(7).select(&data).unwrap();
        assert_eq!(s.indices.len(), 3);
        for (c, &i) in s.centroids.iter().zip(&s.indices) {
            assert_eq!(c, &data[i]);
        }
    }

    #[test]
    fn test_seeding_spreads_over_far_groups() {
        let s = KmeansPlusPlus::new(2).with_seed(0).select(&blobs()).unwrap();
        let near = s.indices.iter().filter(|&&i| i < 2).count();
        assert_eq!(near, 1, "one centroid per group, got {:?}", s.indices);
    }

    #[test]
    fn test_seeding_duplicate_points_fall_back_to_uniform() {
        let data = vec![vec![1.0, 1.0]; 3];
        let s = KmeansPlusPlus::new(3).with_seed(1).select(&data).unwrap();
        assert_eq!(s.centroids, data);
    }

    #[test]
    fn test_seeding_k_larger_than_n_error() {
        let err = KmeansPlusPlus::new(5).select(&blobs()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidClusterCount {
                requested: 5,
                n_items: 4
            }
        );
    }

    #[test]
    fn test_seeding_zero_k_error() {
        assert!(KmeansPlusPlus::new(0).select(&blobs()).is_err());
    }

    #[test]
    fn test_sample_weighted_skips_zero_weights() {
        assert_eq!(sample_weighted(&[0.0, 0.0, 2.0, 0.0], 0.0), 2);
        assert_eq!(sample_weighted(&[1.0, 3.0], 1.5), 1);
        assert_eq!(sample_weighted(&[1.0, 3.0, 0.0], 4.5), 1);
    }

    proptest! {
        #[test]
        fn seeding_picks_distinct_points_when_points_are_distinct(
            n in 1usize..40,
            k_frac in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let data: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, (i * i) as f64]).collect();
            let k = 1 + ((n - 1) as f64 * k_frac) as usize;
            let s = KmeansPlusPlus::new(k).with_seed(seed).select(&data).unwrap();

            prop_assert_eq!(s.indices.len(), k);
            let unique: HashSet<_> = s.indices.iter().collect();
            prop_assert_eq!(unique.len(), k);
        }
    }
}
