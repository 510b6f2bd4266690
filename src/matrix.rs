//! Dense matrix helpers shared by seeding, fitting and metrics.
//!
//! Callers hand in rows as `&[Vec<f64>]`. Every public entry point converts
//! them once, up front, into a row-major [`Array2`] after checking that the
//! set is non-empty, rectangular and finite. The numeric loops downstream can
//! then index without re-validating.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// Validate `rows` and copy them into a `(rows.len(), dim)` array.
///
/// `matrix` names the argument in error messages. When `dim` is `Some`, every
/// row must have exactly that length; otherwise the first row's length is
/// used.
pub fn to_array(rows: &[Vec<f64>], matrix: &'static str, dim: Option<usize>) -> Result<Array2<f64>> {
    let first = rows.first().ok_or(Error::EmptyInput { matrix })?;
    let d = dim.unwrap_or(first.len());
    if d == 0 {
        return Err(Error::InvalidParameter {
            name: "v_len",
            message: "vectors must have at least one component",
        });
    }

    let n = rows.len();
    let mut flat = try_buffer(n, d, matrix)?;
    for (row, values) in rows.iter().enumerate() {
        if values.len() != d {
            return Err(Error::DimensionMismatch {
                matrix,
                row,
                expected: d,
                found: values.len(),
            });
        }
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteValue { matrix, row, col });
        }
        flat.extend_from_slice(values);
    }

    shaped(n, d, flat)
}

/// Zero-filled `(n, d)` array whose storage is reserved fallibly.
pub fn zeros(n: usize, d: usize, what: &'static str) -> Result<Array2<f64>> {
    let mut flat = try_buffer(n, d, what)?;
    flat.resize(n * d, 0.0);
    shaped(n, d, flat)
}

/// `n` copies of `value`, reserved fallibly.
pub fn filled<T: Clone>(n: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(n)
        .map_err(|_| Error::AllocationFailed { what })?;
    buf.resize(n, value);
    Ok(buf)
}

/// Copy an array back out into owned rows.
pub fn to_rows(array: &Array2<f64>) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    rows.try_reserve_exact(array.nrows())
        .map_err(|_| Error::AllocationFailed { what: "result rows" })?;
    for row in array.rows() {
        let mut out = Vec::new();
        out.try_reserve_exact(row.len())
            .map_err(|_| Error::AllocationFailed { what: "result rows" })?;
        out.extend(row.iter().copied());
        rows.push(out);
    }
    Ok(rows)
}

/// Squared Euclidean distance.
#[inline]
pub fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean (L2) norm.
///
/// Components are scaled by the largest magnitude before squaring, so finite
/// vectors whose squares would overflow (entries beyond ~1e154) still get a
/// finite norm. Only a norm that itself exceeds `f64::MAX` is `inf`.
pub fn l2_norm(v: ArrayView1<'_, f64>) -> f64 {
    let scale = v.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale
        * v.iter()
            .map(|x| {
                let r = x / scale;
                r * r
            })
            .sum::<f64>()
            .sqrt()
}

/// Index of the centroid row nearest to `point`, and its squared distance.
///
/// Rows are scanned in index order and only a strictly smaller distance
/// replaces the current best, so ties resolve to the lowest index.
/// `centroids` must have at least one row.
pub fn nearest(point: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = squared_distance(point, centroids.row(0));
    for (c, centroid) in centroids.rows().into_iter().enumerate().skip(1) {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    (best, best_dist)
}

// The buffer always holds exactly `n * d` values by construction.
fn shaped(n: usize, d: usize, flat: Vec<f64>) -> Result<Array2<f64>> {
    Array2::from_shape_vec((n, d), flat).map_err(|_| Error::InvalidParameter {
        name: "shape",
        message: "buffer length does not match rows x columns",
    })
}

fn try_buffer(n: usize, d: usize, what: &'static str) -> Result<Vec<f64>> {
    let len = n
        .checked_mul(d)
        .ok_or(Error::AllocationFailed { what })?;
    let mut flat: Vec<f64> = Vec::new();
    flat.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed { what })?;
    Ok(flat)
}
