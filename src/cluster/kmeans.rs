//! K-means fitting from caller-supplied initial centroids.
//!
//! Lloyd's iteration over an in-memory point set:
//!
//! 1. **Assign**: each point → nearest centroid (squared Euclidean; ties to
//!    the lowest index), accumulating per-cluster sums and counts
//! 2. **Test**: compare each centroid's L2 norm with the norm of its
//!    candidate (sum / count)
//! 3. **Update**: if any norm moved by `epsilon` or more, every centroid
//!    becomes its candidate; otherwise stop
//!
//! # Norm-based convergence
//!
//! Convergence compares *magnitudes*, not positions:
//!
//! ```text
//! converged  ⇔  ∀c: | ‖μ_c‖ − ‖sum_c / count_c‖ | < ε
//! ```
//!
//! A centroid that moves along a sphere around the origin does not count as
//! moving. The test is strict, so `ε = 0` never reports convergence and the
//! run always uses its full `max_iter` budget.
//!
//! # The discarded final pass
//!
//! When the test succeeds, the candidates of that pass are dropped and the
//! centroids from *before* it are returned. Standard k-means would apply the
//! final update first. The difference is bounded by `epsilon` in norm, and
//! it makes the result a fixed point: feeding it back in with
//! `max_iter = 1` reproduces it exactly.
//!
//! # Overflow
//!
//! Inputs are finite, but a cluster sum can still overflow. A candidate with
//! a non-finite component aborts the run with [`Error::NumericOverflow`], and
//! a norm delta that is not a number counts as movement.
//!
//! # Empty clusters
//!
//! A centroid that attracts no points has no mean. [`EmptyClusterPolicy`]
//! picks between keeping its previous value and failing the call.

use super::accumulator::ClusterAccumulator;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::matrix;
use log::{debug, trace};
use ndarray::Array2;

#[cfg(feature = "seeding")]
use super::init::KmeansPlusPlus;

/// Iteration budget used when none is given.
pub const DEFAULT_MAX_ITER: usize = 200;

/// Convergence tolerance used when none is given.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// What to do with a cluster that receives no points in an assignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Keep the previous centroid. Its norm does not change, so it never
    /// blocks convergence.
    #[default]
    Retain,
    /// Abort with [`Error::DegenerateCluster`].
    Error,
}

/// K-means clustering engine.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum assignment passes.
    max_iter: usize,
    /// Convergence tolerance on centroid-norm change.
    epsilon: f64,
    /// Zero-membership handling.
    empty_cluster: EmptyClusterPolicy,
    /// Initial centroids used by [`Clustering::fit_predict`].
    initial: Option<Vec<Vec<f64>>>,
    /// Seed for k-means++ when no initial centroids are configured.
    #[cfg(feature = "seeding")]
    seed: Option<u64>,
}

/// Outcome of a [`Kmeans::fit_report`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansFit {
    /// Final centroids, `k` rows of `v_len` values.
    pub centroids: Vec<Vec<f64>>,
    /// Cluster id of every point from the last assignment pass.
    pub labels: Vec<usize>,
    /// Assignment passes performed.
    pub iterations: usize,
    /// Whether the norm test succeeded before `max_iter` ran out.
    pub converged: bool,
}

impl Kmeans {
    /// Create a new K-means engine for `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            epsilon: DEFAULT_EPSILON,
            empty_cluster: EmptyClusterPolicy::default(),
            initial: None,
            #[cfg(feature = "seeding")]
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set empty-cluster handling.
    pub fn with_empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Fix the initial centroids used by [`Clustering::fit_predict`].
    pub fn with_initial_centroids(mut self, centroids: Vec<Vec<f64>>) -> Self {
        self.initial = Some(centroids);
        self
    }

    /// Set random seed for k-means++ seeding in [`Clustering::fit_predict`].
    #[cfg(feature = "seeding")]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run to convergence (or `max_iter`) and return the final centroids.
    pub fn fit(&self, initial_centroids: &[Vec<f64>], points: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit_report(initial_centroids, points)
            .map(|fit| fit.centroids)
    }

    /// Like [`fit`](Self::fit), also returning labels and iteration stats.
    pub fn fit_report(&self, initial_centroids: &[Vec<f64>], points: &[Vec<f64>]) -> Result<KmeansFit> {
        self.validate()?;
        let (data, mut centroids) = self.load(initial_centroids, points)?;
        let (n, d) = data.dim();

        debug!(
            "kmeans: n={} d={} k={} max_iter={} epsilon={}",
            n, d, self.k, self.max_iter, self.epsilon
        );

        let mut acc = ClusterAccumulator::new(self.k, d)?;
        let mut candidates = matrix::zeros(self.k, d, "candidate centroids")?;
        let mut labels = matrix::filled(n, 0, "labels")?;
        let mut iterations = 0;
        let mut converged = false;

        for iter in 1..=self.max_iter {
            iterations = iter;

            for (label, point) in labels.iter_mut().zip(data.rows()) {
                let (c, _) = matrix::nearest(point, &centroids);
                *label = c;
                acc.add(c, point);
            }
            debug_assert_eq!(acc.counts().iter().sum::<usize>(), n);

            for c in 0..self.k {
                if acc.candidate_into(c, candidates.row_mut(c)) {
                    if candidates.row(c).iter().any(|v| !v.is_finite()) {
                        return Err(Error::NumericOverflow {
                            cluster: c,
                            iteration: iter,
                        });
                    }
                } else {
                    match self.empty_cluster {
                        EmptyClusterPolicy::Retain => {
                            candidates.row_mut(c).assign(&centroids.row(c));
                        }
                        EmptyClusterPolicy::Error => {
                            return Err(Error::DegenerateCluster {
                                cluster: c,
                                iteration: iter,
                            });
                        }
                    }
                }
            }

            match first_moving_cluster(&centroids, &candidates, self.epsilon) {
                None => {
                    converged = true;
                    break;
                }
                Some((c, delta)) => {
                    trace!("kmeans: iter {} cluster {} norm delta {}", iter, c, delta);
                }
            }

            std::mem::swap(&mut centroids, &mut candidates);
            acc.reset();
        }

        debug!(
            "kmeans: stopped after {} iterations (converged: {})",
            iterations, converged
        );

        Ok(KmeansFit {
            centroids: matrix::to_rows(&centroids)?,
            labels,
            iterations,
            converged,
        })
    }

    /// Assign every point to its nearest centroid without updating anything.
    pub fn predict(&self, centroids: &[Vec<f64>], points: &[Vec<f64>]) -> Result<Vec<usize>> {
        self.validate()?;
        let (data, centroids) = self.load(centroids, points)?;
        let mut labels = matrix::filled(data.nrows(), 0, "labels")?;
        for (label, point) in labels.iter_mut().zip(data.rows()) {
            *label = matrix::nearest(point, &centroids).0;
        }
        Ok(labels)
    }

    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be a finite, non-negative number",
            });
        }
        Ok(())
    }

    /// Validate and copy points and centroids; centroids must match `k` and
    /// the points' dimension.
    fn load(&self, centroids: &[Vec<f64>], points: &[Vec<f64>]) -> Result<(Array2<f64>, Array2<f64>)> {
        let data = matrix::to_array(points, "points", None)?;
        if centroids.is_empty() {
            return Err(Error::EmptyInput {
                matrix: "initial centroids",
            });
        }
        if centroids.len() != self.k {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: centroids.len(),
            });
        }
        let centroids = matrix::to_array(centroids, "initial centroids", Some(data.ncols()))?;
        Ok((data, centroids))
    }

    #[cfg(feature = "seeding")]
    fn seed_centroids(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let mut seeding = KmeansPlusPlus::new(self.k);
        if let Some(seed) = self.seed {
            seeding = seeding.with_seed(seed);
        }
        seeding.select(data).map(|s| s.centroids)
    }

    #[cfg(not(feature = "seeding"))]
    fn seed_centroids(&self, _data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        Err(Error::InvalidParameter {
            name: "initial_centroids",
            message: "required when the `seeding` feature is disabled",
        })
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let fit = match &self.initial {
            Some(initial) => self.fit_report(initial, data)?,
            None => self.fit_report(&self.seed_centroids(data)?, data)?,
        };
        Ok(fit.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// Fit `k` centroids to `points`, starting from `initial_centroids`.
///
/// `initial_centroids` must hold exactly `k` rows with the same length as
/// every row of `points`. Stops after `max_iter` assignment passes or once
/// every centroid norm changes by less than `epsilon`.
///
/// ```rust
/// let points = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
/// let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
///
/// let centroids = lloyd::fit(&initial, &points, 2, 10, 1e-4).unwrap();
/// assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
/// ```
pub fn fit(
    initial_centroids: &[Vec<f64>],
    points: &[Vec<f64>],
    k: usize,
    max_iter: usize,
    epsilon: f64,
) -> Result<Vec<Vec<f64>>> {
    Kmeans::new(k)
        .with_max_iter(max_iter)
        .with_epsilon(epsilon)
        .fit(initial_centroids, points)
}

/// First cluster whose norm moves by `epsilon` or more, with that delta.
///
/// A NaN delta (both norms infinite) counts as movement.
fn first_moving_cluster(
    current: &Array2<f64>,
    candidates: &Array2<f64>,
    epsilon: f64,
) -> Option<(usize, f64)> {
    current
        .rows()
        .into_iter()
        .zip(candidates.rows())
        .map(|(old, new)| (matrix::l2_norm(old) - matrix::l2_norm(new)).abs())
        .enumerate()
        .find(|&(_, delta)| delta.is_nan() || delta >= epsilon)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn four_points() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 0.0],
            vec![10.0, 1.0],
        ]
    }

    #[test]
    fn test_kmeans_basic() {
        let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let fit = Kmeans::new(2)
            .with_max_iter(10)
            .with_epsilon(1e-4)
            .fit_report(&initial, &four_points())
            .unwrap();

        assert_eq!(fit.centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
        assert_eq!(fit.labels, vec![0, 0, 1, 1]);
        assert_eq!(fit.iterations, 2);
        assert!(fit.converged);
    }

    #[test]
    fn test_kmeans_single_iteration_applies_update() {
        let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let fit = Kmeans::new(2)
            .with_max_iter(1)
            .fit_report(&initial, &four_points())
            .unwrap();

        assert_eq!(fit.centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
        assert_eq!(fit.iterations, 1);
        assert!(!fit.converged);
    }

    #[test]
    fn test_kmeans_free_function_matches_builder() {
        let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let a = fit(&initial, &four_points(), 2, 10, 1e-4).unwrap();
        let b = Kmeans::new(2)
            .with_max_iter(10)
            .fit(&initial, &four_points())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_kmeans_converging_pass_is_discarded() {
        // Candidate is 0.5, but |0.49 - 0.5| < 0.1 so the old value is kept.
        let points = vec![vec![0.0], vec![1.0]];
        let fit = Kmeans::new(1)
            .with_epsilon(0.1)
            .fit_report(&[vec![0.49]], &points)
            .unwrap();

        assert_eq!(fit.centroids, vec![vec![0.49]]);
        assert_eq!(fit.iterations, 1);
        assert!(fit.converged);
    }

    #[test]
    fn test_kmeans_convergence_ignores_direction() {
        // Candidate [1, 0] has the same norm as [0, 1]: no movement is seen.
        let fit = Kmeans::new(1)
            .fit_report(&[vec![0.0, 1.0]], &[vec![1.0, 0.0]])
            .unwrap();

        assert_eq!(fit.centroids, vec![vec![0.0, 1.0]]);
        assert!(fit.converged);
    }

    #[test]
    fn test_kmeans_zero_epsilon_uses_full_budget() {
        let points = vec![vec![1.0, 2.0], vec![5.0, 5.0]];
        let fit = Kmeans::new(2)
            .with_max_iter(7)
            .with_epsilon(0.0)
            .fit_report(&points, &points)
            .unwrap();

        assert_eq!(fit.centroids, points);
        assert_eq!(fit.iterations, 7);
        assert!(!fit.converged);
    }

    #[test]
    fn test_kmeans_huge_finite_values_still_move() {
        // Squaring 1e200 overflows; the norm test must still see a 2e200 move.
        let fit = Kmeans::new(1)
            .fit_report(&[vec![1e200]], &[vec![3e200]])
            .unwrap();

        assert_eq!(fit.centroids, vec![vec![3e200]]);
        assert_eq!(fit.iterations, 2);
        assert!(fit.converged);
    }

    #[test]
    fn test_kmeans_overflowing_sum_is_an_error() {
        let err = Kmeans::new(1)
            .fit_report(&[vec![0.0]], &[vec![1e308], vec![1e308]])
            .unwrap_err();
        assert_eq!(
            err,
            Error::NumericOverflow {
                cluster: 0,
                iteration: 1
            }
        );
    }

    #[test]
    fn test_first_moving_cluster_treats_nan_delta_as_movement() {
        // Both norms overflow to inf, so the delta is NaN.
        let huge = ndarray::array![[f64::MAX, f64::MAX]];
        assert!(first_moving_cluster(&huge, &huge.clone(), 1e-4).is_some());

        let small = ndarray::array![[1.0, 2.0]];
        assert_eq!(first_moving_cluster(&small, &small.clone(), 1e-4), None);
    }

    #[test]
    fn test_kmeans_empty_cluster_retained() {
        let points = vec![vec![0.0], vec![1.0]];
        let initial = vec![vec![0.0], vec![100.0], vec![0.5]];
        let fit = Kmeans::new(3).fit_report(&initial, &points).unwrap();

        assert_eq!(fit.centroids, vec![vec![0.0], vec![100.0], vec![1.0]]);
        assert_eq!(fit.labels, vec![0, 2]);
        assert!(fit.converged);
    }

    #[test]
    fn test_kmeans_empty_cluster_error() {
        let points = vec![vec![0.0], vec![1.0]];
        let initial = vec![vec![0.0], vec![100.0], vec![0.5]];
        let err = Kmeans::new(3)
            .with_empty_cluster(EmptyClusterPolicy::Error)
            .fit(&initial, &points)
            .unwrap_err();

        assert_eq!(
            err,
            Error::DegenerateCluster {
                cluster: 1,
                iteration: 1
            }
        );
    }

    #[test]
    fn test_kmeans_k_mismatch_error() {
        let initial = vec![vec![0.0, 0.0]];
        let err = fit(&initial, &four_points(), 2, 10, 1e-4).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidClusterCount {
                requested: 2,
                n_items: 1
            }
        );
    }

    #[test]
    fn test_kmeans_centroid_dimension_error() {
        let initial = vec![vec![0.0, 0.0], vec![10.0]];
        let err = fit(&initial, &four_points(), 2, 10, 1e-4).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                matrix: "initial centroids",
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_kmeans_empty_input_error() {
        let points: Vec<Vec<f64>> = vec![];
        let err = fit(&[vec![0.0]], &points, 1, 10, 1e-4).unwrap_err();
        assert_eq!(err, Error::EmptyInput { matrix: "points" });

        let err = fit(&[], &four_points(), 1, 10, 1e-4).unwrap_err();
        assert_eq!(
            err,
            Error::EmptyInput {
                matrix: "initial centroids"
            }
        );
    }

    #[test]
    fn test_kmeans_invalid_parameters() {
        let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        for (k, max_iter, eps, name) in [
            (0, 10, 1e-4, "k"),
            (2, 0, 1e-4, "max_iter"),
            (2, 10, -1.0, "epsilon"),
            (2, 10, f64::NAN, "epsilon"),
            (2, 10, f64::INFINITY, "epsilon"),
        ] {
            let err = fit(&initial, &four_points(), k, max_iter, eps).unwrap_err();
            assert!(
                matches!(err, Error::InvalidParameter { name: n, .. } if n == name),
                "expected {name} error, got {err:?}"
            );
        }
    }

    #[test]
    fn test_kmeans_non_finite_point_error() {
        let mut points = four_points();
        points[2][1] = f64::NAN;
        let err = fit(&[vec![0.0, 0.0], vec![1.0, 1.0]], &points, 2, 10, 1e-4).unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteValue {
                matrix: "points",
                row: 2,
                col: 1
            }
        );
    }

    #[test]
    fn test_kmeans_predict_tie_goes_to_lowest_index() {
        let centroids = vec![vec![-1.0], vec![1.0]];
        let labels = Kmeans::new(2)
            .predict(&centroids, &[vec![0.0], vec![0.9], vec![-3.0]])
            .unwrap();
        assert_eq!(labels, vec![0, 1, 0]);
    }

    #[test]
    fn test_kmeans_fit_predict_with_initial_centroids() {
        let kmeans = Kmeans::new(2).with_initial_centroids(vec![vec![0.0, 0.0], vec![10.0, 0.0]]);
        assert_eq!(kmeans.n_clusters(), 2);
        assert_eq!(kmeans.fit_predict(&four_points()).unwrap(), vec![0, 0, 1, 1]);
    }

    #[cfg(feature = "seeding")]
    #[test]
    fn test_kmeans_fit_predict_seeded() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
        ];
        let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_kmeans_result_is_independent_copy() {
        let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let mut out = fit(&initial, &four_points(), 2, 10, 1e-4).unwrap();
        out[0][0] = 99.0;
        assert_eq!(initial[0][0], 0.0);
    }
}
