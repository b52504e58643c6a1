//! The error type shared by all modules of this crate.

use thiserror::Error;

/// Everything that can go wrong while building graphs, trees or solving
/// assignment problems.
///
/// Empty inputs are never errors; they produce empty results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("the tree already has a root")]
    RootExists,

    #[error("the tree has no root")]
    MissingRoot,

    #[error("the root of a tree cannot be re-parented")]
    ReparentRoot,

    #[error("vertex {0} is not present in the graph")]
    InvalidVertex(usize),

    #[error("node id {0} was added twice")]
    DuplicateVertex(String),

    #[error("multisets must have equal cardinality, got {left} and {right}")]
    CardinalityMismatch { left: usize, right: usize },

    #[error("element {0} is not mapped to any tree node")]
    UnmappedElement(String),

    #[error("no assignment avoids the forbidden cells of the cost matrix")]
    Infeasible,

    #[error("cost matrix entry ({row}, {column}) is not a number")]
    InvalidCost { row: usize, column: usize },

    #[error("unsupported labels: {0}")]
    UnsupportedLabels(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
