//! Drives futures from synchronous hooks and handlers.

use crate::DecoratorError;
use std::{future::Future, io, panic, sync::OnceLock, thread};
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// Hands out a tokio runtime for blocking on futures.
///
/// On a multi-threaded runtime (which is how [`run`](crate::run) executes
/// handlers) the ambient runtime is reused, from a blocking section or from
/// an async task alike. A current-thread runtime cannot be re-entered, so
/// there the future runs on a private single-worker runtime from a separate
/// thread, as it does when no runtime is around at all.
#[derive(Debug, Default)]
pub(crate) struct Executor {
    fallback: OnceLock<Runtime>,
}

impl Executor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn fallback(&self) -> Result<&Runtime, DecoratorError> {
        if let Some(rt) = self.fallback.get() {
            return Ok(rt);
        }
        // The IO driver of the fallback must be polled by a worker thread,
        // since `Handle::block_on` does not drive it.
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        if let Err(lost) = self.fallback.set(rt) {
            lost.shutdown_background();
        }
        self.fallback
            .get()
            .ok_or_else(|| io::Error::other("fallback runtime was not kept").into())
    }

    /// Builds a future with `make`, handing it the handle of the runtime the
    /// future will run on, and blocks until it completes.
    pub(crate) fn run<M, Fut>(&self, make: M) -> Result<Fut::Output, DecoratorError>
    where
        M: FnOnce(Handle) -> Fut + Send,
        Fut: Future,
        Fut::Output: Send,
    {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(move || {
                    let fut = make(handle.clone());
                    handle.block_on(fut)
                }))
            }
            Ok(_) => {
                let rt = self.fallback()?;
                let outcome = thread::scope(|s| {
                    s.spawn(move || rt.block_on(make(rt.handle().clone())))
                        .join()
                });
                Ok(outcome.unwrap_or_else(|e| panic::resume_unwind(e)))
            }
            Err(_) => {
                let rt = self.fallback()?;
                Ok(rt.block_on(make(rt.handle().clone())))
            }
        }
    }

    pub(crate) fn block_on<F>(&self, fut: F) -> Result<F::Output, DecoratorError>
    where
        F: Future + Send,
        F::Output: Send,
    {
        self.run(move |_| fut)
    }
}

impl Drop for Executor {
    // Waiting for the fallback's workers is not allowed from async code.
    fn drop(&mut self) {
        if let Some(rt) = self.fallback.take() {
            rt.shutdown_background();
        }
    }
}
