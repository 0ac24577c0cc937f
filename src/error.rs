use thiserror::Error;

/// Result type alias for the merge-and-optimize core.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Which of the two inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Structural input problems, surfaced before any optimisation work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// One of the inputs has no rows, so no header set can be derived.
    #[error("{side} dataset is empty; cannot derive its column set")]
    EmptyDataset { side: Side },

    /// A row lacks one of the join-key fields.
    #[error("{side} dataset row {row} has no '{field}' field")]
    MissingJoinField {
        side: Side,
        row: usize,
        field: String,
    },

    /// Annealing parameters outside their valid range.
    #[error("invalid annealing configuration: {0}")]
    InvalidConfig(String),
}
