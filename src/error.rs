//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.
//! Every error is terminal for the run that produced it: nothing inside the crate
//! catches and retries, errors propagate to the caller.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Invalid configuration (zero batch size, mismatched label count). Fix the options.
    #[error("{0}")]
    Config(String),

    /// Malformed input file (missing required column, short row). Fix the input.
    #[error("{0}")]
    InputFormat(String),

    /// Tokenization failure. Check input text and tokenizer files.
    #[error("{0}")]
    Tokenization(String),

    /// The classifier broke its contract (wrong score matrix shape). Not retried.
    #[error("{0}")]
    Classifier(String),

    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Filesystem failure opening or writing input/output paths.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}
