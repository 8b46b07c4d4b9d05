use crate::Config;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

/// The invocation context handed to every handler.
///
/// A `Context` belongs to exactly one invocation. It is passed by value through
/// the middleware stack, so `before` hooks can annotate it (fetched parameters,
/// secrets, arbitrary typed state in [`Context::extensions`]) and the handler
/// receives the annotated copy.
#[derive(Clone, Debug, Default)]
pub struct Context {
    /// The AWS request ID generated by the Lambda service.
    pub aws_request_id: String,
    /// The ARN of the Lambda function being invoked.
    pub invoked_function_arn: String,
    /// The execution deadline for the current invocation in milliseconds.
    pub deadline: u64,
    /// Configuration derived from the Lambda environment, when running on Lambda.
    pub env_config: Option<Arc<Config>>,
    /// Values fetched by [`SsmParameterStore`](crate::decorators::SsmParameterStore).
    pub parameters: HashMap<String, String>,
    /// Values fetched by [`SecretsManager`](crate::decorators::SecretsManager).
    pub secrets: HashMap<String, Value>,
    /// The tokio runtime driving an [`async_handler`](crate::decorators::async_handler).
    pub runtime: Option<tokio::runtime::Handle>,
    /// Typed state attached by hooks.
    pub extensions: http::Extensions,
}

impl Context {
    /// Creates a context for the given request ID.
    pub fn new(aws_request_id: impl Into<String>) -> Self {
        Self {
            aws_request_id: aws_request_id.into(),
            ..Self::default()
        }
    }
}

impl From<lambda_runtime::Context> for Context {
    fn from(ctx: lambda_runtime::Context) -> Self {
        Self {
            aws_request_id: ctx.request_id,
            invoked_function_arn: ctx.invoked_function_arn,
            deadline: ctx.deadline,
            ..Self::default()
        }
    }
}
