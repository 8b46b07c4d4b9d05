//! Composition of cross-cutting behavior around a [`Handler`].
//!
//! A [`Middleware`] bundles up to three hooks:
//!
//! * `before` runs ahead of the wrapped handler and may rewrite or reject the
//!   event and context,
//! * `after` runs on the handler's successful response,
//! * `on_exception` runs when `before` or the handler fails, and may turn the
//!   failure into a response.
//!
//! [`decorate`] wraps a handler with a middleware and yields another
//! [`Handler`], so stacking is plain nesting: in `decorate(d1, decorate(d2, h))`
//! the `before` hooks run `d1` then `d2`, and the responses flow back through
//! `d2` then `d1`.
//!
//! ```
//! use lambda_decorators::{decorate, handler_fn, Context, Error, Handler, Hooks};
//! use serde_json::{json, Value};
//!
//! let hello = handler_fn(|event: Value, _ctx: Context| -> Result<Value, Error> {
//!     Ok(json!({ "hello": event["name"] }))
//! });
//! let tagged = Hooks::new().after(|mut response: Value| {
//!     response["tagged"] = json!(true);
//!     Ok(response)
//! });
//!
//! let handler = decorate(tagged, hello);
//! let response = handler.call(json!({ "name": "world" }), Context::default())?;
//! assert_eq!(json!({ "hello": "world", "tagged": true }), response);
//! # Ok::<(), Error>(())
//! ```

use crate::{Context, Error, Handler};
use log::trace;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// A bundle of optional hooks applied around a [`Handler`].
///
/// Every method has a pass-through default, so an implementation only spells
/// out the hooks it cares about.
pub trait Middleware {
    /// Runs before the wrapped handler. The returned pair is what the handler
    /// receives. Returning an error skips the handler and routes the error to
    /// [`Middleware::on_exception`].
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        Ok((event, ctx))
    }

    /// Runs on the response of a successful invocation.
    ///
    /// An error returned here propagates to the enclosing layer; it does not
    /// pass through this layer's [`Middleware::on_exception`].
    fn after(&self, response: Value) -> Result<Value, Error> {
        Ok(response)
    }

    /// Runs when [`Middleware::before`] or the wrapped handler fails. Returning
    /// `Ok` recovers; the default re-signals the error unchanged.
    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        Err(err)
    }
}

impl<M: Middleware + ?Sized> Middleware for &M {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        (**self).before(event, ctx)
    }

    fn after(&self, response: Value) -> Result<Value, Error> {
        (**self).after(response)
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        (**self).on_exception(err)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        (**self).before(event, ctx)
    }

    fn after(&self, response: Value) -> Result<Value, Error> {
        (**self).after(response)
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        (**self).on_exception(err)
    }
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        (**self).before(event, ctx)
    }

    fn after(&self, response: Value) -> Result<Value, Error> {
        (**self).after(response)
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        (**self).on_exception(err)
    }
}

type BeforeFn = dyn Fn(Value, Context) -> Result<(Value, Context), Error> + Send + Sync;
type AfterFn = dyn Fn(Value) -> Result<Value, Error> + Send + Sync;
type OnExceptionFn = dyn Fn(Error) -> Result<Value, Error> + Send + Sync;

/// A [`Middleware`] assembled from closures.
///
/// Each hook is optional; a missing hook behaves like the trait default.
#[derive(Default)]
pub struct Hooks {
    before: Option<Box<BeforeFn>>,
    after: Option<Box<AfterFn>>,
    on_exception: Option<Box<OnExceptionFn>>,
}

impl Hooks {
    /// Creates a middleware with no hooks set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `before` hook.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, Context) -> Result<(Value, Context), Error> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(f));
        self
    }

    /// Sets the `after` hook.
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(f));
        self
    }

    /// Sets the `on_exception` hook.
    pub fn on_exception<F>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.on_exception = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("on_exception", &self.on_exception.is_some())
            .finish()
    }
}

impl Middleware for Hooks {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        match &self.before {
            Some(f) => f(event, ctx),
            None => Ok((event, ctx)),
        }
    }

    fn after(&self, response: Value) -> Result<Value, Error> {
        match &self.after {
            Some(f) => f(response),
            None => Ok(response),
        }
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        match &self.on_exception {
            Some(f) => f(err),
            None => Err(err),
        }
    }
}

/// A handler wrapped by a middleware. Created by [`decorate`].
#[derive(Clone, Copy, Debug)]
pub struct Decorated<M, H> {
    middleware: M,
    handler: H,
}

impl<M, H> Decorated<M, H> {
    /// Returns the middleware applied by this layer.
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Returns the wrapped handler.
    pub fn inner(&self) -> &H {
        &self.handler
    }

    /// Splits the layer back into its middleware and handler.
    pub fn into_parts(self) -> (M, H) {
        (self.middleware, self.handler)
    }
}

/// Wraps `handler` with `middleware`, producing a handler with the same calling
/// convention.
pub fn decorate<M, H>(middleware: M, handler: H) -> Decorated<M, H>
where
    M: Middleware,
    H: Handler,
{
    Decorated {
        middleware,
        handler,
    }
}

impl<M, H> Handler for Decorated<M, H>
where
    M: Middleware,
    H: Handler,
{
    fn call(&self, event: Value, ctx: Context) -> Result<Value, Error> {
        let outcome = self
            .middleware
            .before(event, ctx)
            .and_then(|(event, ctx)| self.handler.call(event, ctx));

        match outcome {
            Ok(response) => self.middleware.after(response),
            Err(err) => {
                trace!("routing failure to on_exception: {}", err);
                self.middleware.on_exception(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{err_fmt, handler_fn, HandlerExt};
    use serde_json::json;
    use std::sync::Mutex;

    fn echo() -> impl Handler {
        handler_fn(|event: Value, _ctx: Context| -> Result<Value, Error> { Ok(event) })
    }

    fn failing() -> impl Handler {
        handler_fn(|_event: Value, _ctx: Context| -> Result<Value, Error> {
            Err(err_fmt!("barf").into())
        })
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Hooks {
        let before_log = Arc::clone(log);
        let after_log = Arc::clone(log);
        Hooks::new()
            .before(move |event, ctx| {
                before_log.lock().unwrap().push(format!("{}.before", name));
                Ok((event, ctx))
            })
            .after(move |response| {
                after_log.lock().unwrap().push(format!("{}.after", name));
                Ok(response)
            })
    }

    #[test]
    fn stacked_befores_run_outer_to_inner() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first_log = Arc::clone(&log);
        let second_log = Arc::clone(&log);
        let first = Hooks::new().before(move |event, ctx| {
            first_log.lock().unwrap().push("first");
            Ok((event, ctx))
        });
        let second = Hooks::new().before(move |event, ctx| {
            second_log.lock().unwrap().push("second");
            Ok((event, ctx))
        });
        let handler = decorate(
            first,
            decorate(
                second,
                handler_fn(|_: Value, _: Context| -> Result<Value, Error> { Ok(json!("foobar")) }),
            ),
        );

        let response = handler.call(json!({}), Context::default()).unwrap();
        assert_eq!(json!("foobar"), response);
        assert_eq!(vec!["first", "second"], *log.lock().unwrap());
    }

    #[test]
    fn afters_run_inner_to_outer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = echo()
            .with(recorder(&log, "inner"))
            .with(recorder(&log, "outer"));

        handler.call(json!(1), Context::default()).unwrap();
        assert_eq!(
            vec!["outer.before", "inner.before", "inner.after", "outer.after"],
            *log.lock().unwrap()
        );
    }

    #[test]
    fn before_receives_and_rewrites_pair() {
        let stamp = Hooks::new().before(|mut event: Value, mut ctx: Context| {
            event["seen"] = json!(true);
            ctx.parameters.insert(String::from("k"), String::from("v"));
            Ok((event, ctx))
        });
        let handler = decorate(
            stamp,
            handler_fn(|event: Value, ctx: Context| -> Result<Value, Error> {
                Ok(json!({ "event": event, "k": ctx.parameters["k"] }))
            }),
        );

        let response = handler.call(json!({ "a": 1 }), Context::default()).unwrap();
        assert_eq!(
            json!({ "event": { "a": 1, "seen": true }, "k": "v" }),
            response
        );
    }

    #[test]
    fn failing_before_skips_handler() {
        let calls = Arc::new(Mutex::new(0));
        let counted = Arc::clone(&calls);
        let reject = Hooks::new()
            .before(|_, _| Err(err_fmt!("rejected").into()))
            .on_exception(|err| Ok(json!({ "error": err.to_string() })));
        let handler = decorate(
            reject,
            handler_fn(move |event: Value, _: Context| -> Result<Value, Error> {
                *counted.lock().unwrap() += 1;
                Ok(event)
            }),
        );

        let response = handler.call(json!({}), Context::default()).unwrap();
        assert_eq!(json!({ "error": "rejected" }), response);
        assert_eq!(0, *calls.lock().unwrap());
    }

    #[test]
    fn default_on_exception_resignals() {
        let handler = decorate(Hooks::new(), failing());
        let err = handler.call(json!({}), Context::default()).unwrap_err();
        assert_eq!("barf", err.to_string());
    }

    #[test]
    fn recovery_is_seen_as_success_outside() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recover = Hooks::new().on_exception(|_| Ok(json!("recovered")));
        let handler = failing().with(recover).with(recorder(&log, "outer"));

        let response = handler.call(json!({}), Context::default()).unwrap();
        assert_eq!(json!("recovered"), response);
        assert_eq!(
            vec!["outer.before", "outer.after"],
            *log.lock().unwrap()
        );
    }

    #[test]
    fn failing_after_skips_own_on_exception() {
        let layer = Hooks::new()
            .after(|_| Err(err_fmt!("after failed").into()))
            .on_exception(|_| Ok(json!("swallowed")));
        let handler = echo().with(layer);

        let err = handler.call(json!({}), Context::default()).unwrap_err();
        assert_eq!("after failed", err.to_string());
    }

    #[test]
    fn shared_middleware_through_arc() {
        let shared = Arc::new(Hooks::new().after(|_| Ok(json!("shared"))));
        let a = decorate(Arc::clone(&shared), echo());
        let b = decorate(&*shared, echo());

        assert_eq!(json!("shared"), a.call(json!(1), Context::default()).unwrap());
        assert_eq!(json!("shared"), b.call(json!(2), Context::default()).unwrap());
    }

    #[test]
    fn into_parts_returns_layers() {
        let handler = decorate(Hooks::new(), echo());
        assert!(handler.middleware().before.is_none());
        let (hooks, inner) = handler.into_parts();
        assert_eq!(
            "Hooks { before: false, after: false, on_exception: false }",
            format!("{:?}", hooks)
        );
        assert_eq!(json!(3), inner.call(json!(3), Context::default()).unwrap());
    }
}
