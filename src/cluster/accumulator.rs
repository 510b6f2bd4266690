//! Per-cluster running sums and member counts.

use crate::error::Result;
use crate::matrix;
use ndarray::{Array2, ArrayView1, ArrayViewMut1};

/// Running sum vector and member count for each of `k` clusters.
///
/// Filled during an assignment pass, read to form candidate centroids, then
/// reset before the next pass.
#[derive(Debug, Clone)]
pub(crate) struct ClusterAccumulator {
    sums: Array2<f64>,
    counts: Vec<usize>,
}

impl ClusterAccumulator {
    pub(crate) fn new(k: usize, d: usize) -> Result<Self> {
        Ok(Self {
            sums: matrix::zeros(k, d, "cluster sums")?,
            counts: matrix::filled(k, 0, "cluster counts")?,
        })
    }

    /// Route `point` into `cluster`.
    pub(crate) fn add(&mut self, cluster: usize, point: ArrayView1<'_, f64>) {
        let mut sum = self.sums.row_mut(cluster);
        sum += &point;
        self.counts[cluster] += 1;
    }

    pub(crate) fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Write `sum / count` for `cluster` into `out`.
    ///
    /// Returns `false` and leaves `out` untouched when the cluster is empty.
    pub(crate) fn candidate_into(&self, cluster: usize, mut out: ArrayViewMut1<'_, f64>) -> bool {
        let count = self.counts[cluster];
        if count == 0 {
            return false;
        }
        let count = count as f64;
        for (o, s) in out.iter_mut().zip(self.sums.row(cluster).iter()) {
            *o = s / count;
        }
        true
    }

    pub(crate) fn reset(&mut self) {
        self.sums.fill(0.0);
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
