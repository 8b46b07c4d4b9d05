use crate::{response::status_response, Context, DecoratorError, Error, Middleware};
use http::StatusCode;
use log::error;
use serde_json::Value;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

/// The request IDs already handled by this execution environment.
///
/// Clones share one set. Entries are never evicted, so memory grows with every
/// distinct request ID: don't use it on very frequently invoked functions.
#[derive(Clone, Debug, Default)]
pub struct SeenRequests {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl SeenRequests {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave the set half-updated.
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `request_id`. Returns `false` when it had already been seen.
    pub fn insert(&self, request_id: &str) -> bool {
        self.ids().insert(request_id.to_string())
    }

    /// Returns `true` if `request_id` has been recorded.
    pub fn contains(&self, request_id: &str) -> bool {
        self.ids().contains(request_id)
    }

    /// The number of recorded request IDs.
    pub fn len(&self) -> usize {
        self.ids().len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

/// Stops retries of failed scheduled invocations.
///
/// AWS Lambda retries asynchronous invocations (such as scheduled events) that
/// fail, reusing the original request ID. This middleware remembers every
/// request ID it admits; a repeated one is logged and answered with
/// `{"statusCode": 200}` without running the handler, so the platform sees a
/// success and stops retrying.
///
/// Detection is per execution environment: a retry landing on a different
/// instance is not caught.
#[derive(Clone, Debug, Default)]
pub struct NoRetryOnFailure {
    /// The set of admitted request IDs.
    pub seen: SeenRequests,
}

impl NoRetryOnFailure {
    /// Uses an existing set, for instance one shared by several handlers.
    pub fn with_seen(seen: SeenRequests) -> Self {
        Self { seen }
    }
}

impl Middleware for NoRetryOnFailure {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        if !self.seen.insert(&ctx.aws_request_id) {
            return Err(DecoratorError::RetryDetected {
                request_id: ctx.aws_request_id,
            }
            .into());
        }
        Ok((event, ctx))
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        match DecoratorError::find(&err) {
            Some(e @ DecoratorError::RetryDetected { .. }) => {
                error!("{}", e);
                Ok(status_response(StatusCode::OK))
            }
            _ => Err(err),
        }
    }
}
