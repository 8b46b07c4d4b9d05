use crate::{executor::Executor, Context, Error, Handler};
use serde_json::Value;
use std::{fmt, future::Future};

/// Runs an `async` handler to completion on a tokio runtime.
///
/// The runtime's handle is placed on [`Context::runtime`] before the handler
/// is called, so the handler can spawn work on it. When invoked on a
/// multi-threaded tokio runtime, from a blocking section (as
/// [`run`](crate::run) does) or straight from an async task, that runtime is
/// used; otherwise the handler runs on a private runtime started on first
/// use, driven from its own thread.
///
/// ```
/// use lambda_decorators::{decorators::async_handler, Context, Error, Handler};
/// use serde_json::{json, Value};
///
/// async fn hello(event: Value, _ctx: Context) -> Result<Value, Error> {
///     Ok(json!({ "hello": event["name"] }))
/// }
///
/// let handler = async_handler(hello);
/// assert_eq!(
///     json!({ "hello": "world" }),
///     handler.call(json!({ "name": "world" }), Context::default())?
/// );
/// # Ok::<(), Error>(())
/// ```
pub fn async_handler<F, Fut, E>(f: F) -> AsyncHandler<F>
where
    F: Fn(Value, Context) -> Fut,
    Fut: Future<Output = Result<Value, E>>,
    E: Into<Error>,
{
    AsyncHandler {
        f,
        executor: Executor::new(),
    }
}

/// A synchronous [`Handler`] driving an `async` function. Created by
/// [`async_handler`].
pub struct AsyncHandler<F> {
    f: F,
    executor: Executor,
}

impl<F> fmt::Debug for AsyncHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHandler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl<F, Fut, E> Handler for AsyncHandler<F>
where
    F: Fn(Value, Context) -> Fut + Sync,
    Fut: Future<Output = Result<Value, E>>,
    E: Into<Error>,
{
    fn call(&self, event: Value, mut ctx: Context) -> Result<Value, Error> {
        let f = &self.f;
        self.executor.run(move |handle| {
            ctx.runtime = Some(handle);
            let fut = f(event, ctx);
            async move { fut.await.map_err(Into::<Error>::into) }
        })?
    }
}
