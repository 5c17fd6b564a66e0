//! Error taxonomy for the metadata pipeline.

use thiserror::Error;

/// Failures raised by individual pipeline steps.
///
/// Only [`PipelineError::RetryExhausted`] is ever handed back from an operation
/// wrapped by [`RetryPolicy`](crate::retry::RetryPolicy); the resolver turns
/// every other variant into an error message on the result record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Connection failure, timeout, or unreadable response body.
    #[error("Transport error for {target}: {reason}")]
    Transport { target: String, reason: String },

    /// Server answered with a non-2xx status.
    #[error("HTTP error: status {status} from {target}")]
    HttpStatus { status: u16, target: String },

    /// Malformed HTML, JSON or URL.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed response that carried no usable data.
    #[error("No result: {0}")]
    NoResult(String),

    /// Caller supplied something the pipeline cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bounded retries ran out; wraps the last underlying failure.
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Builds a transport error from any displayable cause.
    pub fn transport(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport { target: target.into(), reason: reason.to_string() }
    }
}
