use thiserror::Error;

/// Errors from the pure amortization core. All of these are recoverable: the
/// core never panics on bad numeric input, it reports what the caller got
/// wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },

    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },
}

/// Errors from the optional advisory-text generator. Callers are expected to
/// render these inline instead of failing the whole analysis.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory endpoint is not configured")]
    NotConfigured,

    #[error("advisory request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("advisory service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("advisory response contained no generated text")]
    EmptyResponse,
}
