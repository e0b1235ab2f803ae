use thiserror::Error;

/// Errors raised by the prediction engine.
///
/// None of these depend on user input once the rating range is configured
/// correctly; they signal a defect in the caller or in the engine setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarrotError {
    #[error("a.len() + b.len() - 1 is {a_len} + {b_len} - 1 = {result_len}, expected <= {capacity}")]
    CapacityExceeded {
        a_len: usize,
        b_len: usize,
        result_len: usize,
        capacity: usize,
    },

    #[error("binary search bounds inverted: low {low} must be <= high {high}")]
    InvertedBounds { low: i32, high: i32 },

    #[error("Unknown prediction type: {0}")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, CarrotError>;
