//! Failures raised by the bundled decorators.
//!
//! Hooks and handlers signal failure through the boxed [`Error`](crate::Error).
//! Decorators that recover from their own failures do so by downcasting to
//! [`DecoratorError`]; anything else is re-signalled untouched.

use thiserror::Error;

/// An error raised by one of the bundled decorators.
#[derive(Debug, Error)]
pub enum DecoratorError {
    /// A field that should contain JSON could not be parsed.
    #[error("malformed JSON in `{field}`: {source}")]
    MalformedJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The event does not satisfy the request schema.
    #[error("RequestValidationError: {0}")]
    RequestValidation(String),

    /// The handler's response does not satisfy the response schema.
    #[error("ResponseValidationError: {0}")]
    ResponseValidation(String),

    /// A JSON schema handed to a validator does not compile.
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),

    /// The request ID was already processed by this execution environment.
    #[error("Retry attempt on request id {request_id} detected.")]
    RetryDetected { request_id: String },

    /// The parameter store did not return every requested parameter.
    #[error("parameters not found: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// The parameter store request failed.
    #[error("parameter store error: {0}")]
    ParameterStore(String),

    /// The secret store request failed.
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// A tokio runtime could not be started.
    #[error(transparent)]
    Runtime(#[from] std::io::Error),
}

impl DecoratorError {
    /// Returns the decorator error wrapped in `err`, if there is one.
    pub fn find(err: &crate::Error) -> Option<&Self> {
        err.downcast_ref::<Self>()
    }
}
