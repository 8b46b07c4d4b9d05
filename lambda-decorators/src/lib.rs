#![deny(clippy::all)]
#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! Composable middlewares for AWS Lambda handlers invoked through API Gateway
//! or scheduled triggers.
//!
//! A handler is anything implementing [`Handler`]: it takes the event as JSON
//! plus the invocation [`Context`] and returns a JSON response. Cross-cutting
//! concerns (CORS headers, JSON bodies, schema validation, duplicate
//! invocation detection, fetching parameters and secrets) are expressed as
//! [`Middleware`]s and stacked around the handler with [`decorate`], or with
//! the [`macro@decorate`] attribute on a plain function.
//!
//! ```
//! use lambda_decorators::decorators::{CorsHeaders, JsonHttpResp, LoadJsonBody};
//! use lambda_decorators::{handler_fn, Context, Error, Handler, HandlerExt};
//! use serde_json::{json, Value};
//!
//! let hello = handler_fn(|event: Value, _ctx: Context| -> Result<Value, Error> {
//!     Ok(json!({ "hello": event["body"]["name"] }))
//! })
//! .with(LoadJsonBody::default())
//! .with(JsonHttpResp::default())
//! .with(CorsHeaders::default());
//!
//! let response = hello.call(json!({ "body": r#"{"name": "world"}"# }), Context::default())?;
//! assert_eq!(
//!     json!({
//!         "statusCode": 200,
//!         "body": r#"{"hello":"world"}"#,
//!         "headers": { "Access-Control-Allow-Origin": "*" },
//!     }),
//!     response
//! );
//! # Ok::<(), Error>(())
//! ```
use lambda_runtime::{service_fn, LambdaEvent};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use crate::{
    error::DecoratorError,
    error_hook::ErrorReport,
    middleware::{decorate, Decorated, Hooks, Middleware},
    types::Context,
};
pub use lambda_decorators_attributes::decorate;

pub mod decorators;
pub mod error;
/// Mechanism to provide a custom error reporting hook.
pub mod error_hook;
pub mod middleware;
pub mod response;
mod executor;
/// Types available to a Lambda function.
mod types;

/// The failure type shared by handlers and hooks.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
#[doc(hidden)]
/// A string error, which can be displayed.
pub struct StringError(pub String);

impl std::error::Error for StringError {}

impl std::fmt::Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

/// Builds a [`StringError`] from format arguments.
#[doc(hidden)]
#[macro_export]
macro_rules! err_fmt {
    {$($t:tt)*} => {
        $crate::StringError(format!($($t)*))
    }
}

/// A struct containing configuration values derived from environment variables.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Config {
    /// The host and port of the [runtime API](https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html).
    #[serde(rename = "AWS_LAMBDA_RUNTIME_API")]
    pub endpoint: String,
    /// The name of the function.
    #[serde(rename = "AWS_LAMBDA_FUNCTION_NAME")]
    pub function_name: String,
    /// The amount of memory available to the function in MB.
    #[serde(rename = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE")]
    pub memory: i32,
    /// The version of the function being executed.
    #[serde(rename = "AWS_LAMBDA_FUNCTION_VERSION")]
    pub version: String,
    /// The name of the Amazon CloudWatch Logs stream for the function.
    #[serde(rename = "AWS_LAMBDA_LOG_STREAM_NAME")]
    pub log_stream: String,
    /// The name of the Amazon CloudWatch Logs group for the function.
    #[serde(rename = "AWS_LAMBDA_LOG_GROUP_NAME")]
    pub log_group: String,
}

impl Config {
    /// Attempts to read configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let conf = envy::from_env::<Config>()?;
        Ok(conf)
    }
}

/// A synchronous function from an event and its [`Context`] to a response.
pub trait Handler {
    /// Processes the incoming event and returns the response.
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error>;
}

impl<H: Handler + ?Sized> Handler for &H {
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error> {
        (**self).call(event, ctx)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error> {
        (**self).call(event, ctx)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error> {
        (**self).call(event, ctx)
    }
}

/// Returns a new `HandlerFn` with the given closure.
pub fn handler_fn<Function>(f: Function) -> HandlerFn<Function> {
    HandlerFn { f }
}

/// A `Handler` implemented by a closure.
#[derive(Copy, Clone, Debug)]
pub struct HandlerFn<Function> {
    f: Function,
}

impl<Function, Err> Handler for HandlerFn<Function>
where
    Function: Fn(Value, Context) -> Result<Value, Err>,
    Err: Into<Error>,
{
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error> {
        (self.f)(event, ctx).map_err(Into::into)
    }
}

/// Method-chaining form of [`decorate`].
pub trait HandlerExt: Handler + Sized {
    /// Wraps `self` with `middleware`. Each call adds an outer layer, so
    /// `h.with(inner).with(outer)` equals `decorate(outer, decorate(inner, h))`.
    fn with<M: Middleware>(self, middleware: M) -> Decorated<M, Self> {
        decorate(middleware, self)
    }
}

impl<H: Handler> HandlerExt for H {}

/// Starts the Lambda runtime and serves `handler` for every invocation.
///
/// Each invocation runs on a blocking thread so middlewares are free to block
/// (for example while fetching parameters). A failing invocation is reported
/// through the current [error hook](error_hook::set_error_hook).
///
/// # Example
/// ```no_run
/// use lambda_decorators::{decorators::JsonHttpResp, handler_fn, Context, Error, HandlerExt};
/// use serde_json::{json, Value};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Error> {
///     let func = handler_fn(func).with(JsonHttpResp::default());
///     lambda_decorators::run(func).await?;
///     Ok(())
/// }
///
/// fn func(_event: Value, _ctx: Context) -> Result<Value, Error> {
///     Ok(json!({ "hello": "world" }))
/// }
/// ```
pub async fn run<H>(handler: H) -> Result<(), Error>
where
    H: Handler + Send + Sync + 'static,
{
    let config = Arc::new(Config::from_env()?);
    debug!("starting {} (version {})", config.function_name, config.version);

    let handler = Arc::new(handler);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        invoke(Arc::clone(&handler), Some(Arc::clone(&config)), event)
    }))
    .await
}

async fn invoke<H>(
    handler: Arc<H>,
    config: Option<Arc<Config>>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error>
where
    H: Handler + Send + Sync + 'static,
{
    let payload = event.payload;
    let mut ctx = Context::from(event.context);
    ctx.env_config = config;

    let request_id = ctx.aws_request_id.clone();
    let outcome = tokio::task::spawn_blocking(move || handler.call(payload, ctx)).await?;

    outcome.map_err(|err| {
        let report = error_hook::generate_report(&err);
        error!("invocation {} failed: {}", request_id, report);
        Box::new(report) as Error
    })
}
