//! Error types for the Kohonen map training engine.

use thiserror::Error;

/// The main error type for Kohonen operations.
#[derive(Error, Debug)]
pub enum KohonenError {
    /// Invalid configuration (grid sizes, dimension, hyperparameters).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two vectors of different lengths were combined or compared.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The length the operation required.
        expected: usize,
        /// The length that was supplied.
        found: usize,
    },

    /// An input vector contains NaN or an infinite component.
    #[error("Input vector {index} contains a non-finite value")]
    NonFinite {
        /// Index of the offending input vector.
        index: usize,
    },

    /// Empty input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Grid coordinates outside the map.
    #[error("Node ({i}, {j}) is outside the {x_size}x{y_size} grid")]
    NodeOutOfBounds {
        /// Row coordinate.
        i: usize,
        /// Column coordinate.
        j: usize,
        /// Grid width.
        x_size: usize,
        /// Grid height.
        y_size: usize,
    },

    /// Malformed line in an input vector file.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Kohonen operations.
pub type Result<T> = std::result::Result<T, KohonenError>;

impl From<serde_json::Error> for KohonenError {
    fn from(err: serde_json::Error) -> Self {
        KohonenError::Serialization(err.to_string())
    }
}

impl KohonenError {
    /// Shorthand for a length mismatch between two vectors.
    pub(crate) fn mismatch(expected: usize, found: usize) -> Self {
        KohonenError::DimensionMismatch { expected, found }
    }
}
