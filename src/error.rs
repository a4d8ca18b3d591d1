use core::fmt;

/// Result alias for `doclust`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by corpus loading, similarity construction, clustering
/// and agreement evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Dimension mismatch between two inputs that must agree.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// A document has an all-zero term vector, so its cosine similarity
    /// is undefined.
    ZeroVector {
        /// Index of the offending document.
        doc: usize,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Random bisection kept producing an empty side.
    UnsplittableCluster {
        /// Cluster id that could not be bisected.
        cluster: usize,
        /// Number of seed pairs tried.
        attempts: usize,
    },

    /// Two clusterings compared for agreement have different cluster counts.
    MismatchedClusterCount {
        /// Cluster count of the first clustering.
        left: usize,
        /// Cluster count of the second clustering.
        right: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Malformed corpus or vocabulary input.
    Parse {
        /// 1-based line number where the problem was found.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Underlying I/O failure.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ZeroVector { doc } => {
                write!(f, "document {doc} has an all-zero term vector")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::UnsplittableCluster { cluster, attempts } => {
                write!(
                    f,
                    "cluster {cluster} could not be bisected after {attempts} seed pairs"
                )
            }
            Error::MismatchedClusterCount { left, right } => {
                write!(
                    f,
                    "clusterings have different cluster counts: {left} vs {right}"
                )
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::Parse { line, message } => write!(f, "line {line}: {message}"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
