use thiserror::Error;

/// Errors that can occur while training or evaluating sentence-pair models.
#[derive(Debug, Error)]
pub enum SentPairError {
    /// Two parallel inputs (labels, predictions, ids) have different lengths.
    #[error("length mismatch: {left} {what} vs {right}")]
    LengthMismatch {
        /// Which inputs were being compared.
        what: &'static str,
        /// Length of the first input.
        left: usize,
        /// Length of the second input.
        right: usize,
    },

    /// A hyper-parameter or path in the trainer configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dataset file is malformed.
    #[error("invalid data at {path}:{line}: {reason}")]
    InvalidData {
        /// File being read.
        path: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A split contained no examples.
    #[error("dataset split {0:?} is empty")]
    EmptySplit(String),

    /// Tokenizer failure.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Checkpoint could not be written or read back.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Candle ML framework error.
    #[error("ML framework error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sentpair operations.
pub type Result<T> = std::result::Result<T, SentPairError>;

/// Returns an error when two parallel slices differ in length.
pub(crate) fn ensure_same_len(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(SentPairError::LengthMismatch { what, left, right });
    }
    Ok(())
}
