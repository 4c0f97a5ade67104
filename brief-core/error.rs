use thiserror::Error;

/// Precondition violations detected at the boundary of the encoder or matcher.
///
/// None of these are retryable: the computation is deterministic, so the same
/// inputs reproduce the same error.
#[derive(Debug, Error)]
pub enum BriefError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Keypoint {keypoint} samples pixel index {index} outside buffer of length {len}")]
    OutOfBounds {
        keypoint: usize,
        index: isize,
        len: usize,
    },

    #[error("Size mismatch in {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BriefError {
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        BriefError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

pub type BriefResult<T> = Result<T, BriefError>;
