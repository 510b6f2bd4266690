use core::fmt;

/// Result alias for `lloyd`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by seeding, fitting and metric primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput {
        /// Which argument was empty.
        matrix: &'static str,
    },

    /// A row's length differs from the first row of the point set.
    DimensionMismatch {
        /// Which argument the row belongs to.
        matrix: &'static str,
        /// Row index.
        row: usize,
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Entry is NaN or infinite.
    NonFiniteValue {
        /// Which argument the entry belongs to.
        matrix: &'static str,
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items available (centroids supplied, or points to seed from).
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A cluster attracted no points during an assignment pass.
    DegenerateCluster {
        /// Cluster id.
        cluster: usize,
        /// 1-based iteration the cluster emptied on.
        iteration: usize,
    },

    /// A candidate centroid left the finite range (a cluster sum overflowed).
    NumericOverflow {
        /// Cluster id.
        cluster: usize,
        /// 1-based iteration the overflow happened on.
        iteration: usize,
    },

    /// Working storage could not be reserved.
    AllocationFailed {
        /// What was being allocated.
        what: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput { matrix } => write!(f, "empty input provided for {matrix}"),
            Error::DimensionMismatch {
                matrix,
                row,
                expected,
                found,
            } => {
                write!(
                    f,
                    "dimension mismatch in {matrix} row {row}: expected {expected}, found {found}"
                )
            }
            Error::NonFiniteValue { matrix, row, col } => {
                write!(f, "non-finite value in {matrix} at [{row}][{col}]")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::DegenerateCluster { cluster, iteration } => {
                write!(
                    f,
                    "cluster {cluster} has no members at iteration {iteration}"
                )
            }
            Error::NumericOverflow { cluster, iteration } => {
                write!(
                    f,
                    "centroid of cluster {cluster} overflowed at iteration {iteration}"
                )
            }
            Error::AllocationFailed { what } => write!(f, "failed to allocate {what}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
