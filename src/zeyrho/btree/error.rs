use thiserror::Error;

/// Errors raised by the B-tree.
///
/// Looking up or removing an absent value is not an error. Every variant
/// other than `InvalidMinDegree` means a caller broke a node contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BTreeError {
    #[error("the minimum degree must be at least 2 and at most usize::MAX / 2, got {0}")]
    InvalidMinDegree(usize),

    #[error("unable to {operation} a non-leaf node")]
    NotALeaf { operation: &'static str },

    #[error("unable to insert into a full node")]
    NodeFull,

    #[error("structural invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, BTreeError>;
