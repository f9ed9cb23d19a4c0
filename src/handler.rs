//! Tick handler plumbing
//!
//! A handler is either synchronous (runs to completion inside the tick)
//! or asynchronous (hands back a future the tick awaits). Both resolve
//! to a [`TickResult`], and a panic anywhere in the handler is captured
//! as [`HandlerPanic`](crate::HandlerPanic) so it surfaces through the
//! same channel as a returned error.

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{HandlerError, HandlerPanic, TickResult};

/// Completion hook invoked after every finished tick: `Some(&err)` when
/// the handler failed, `None` when it succeeded.
pub type ErrorHandler = Box<dyn FnMut(Option<&HandlerError>) + Send>;

type SyncHandler = Box<dyn FnMut() -> TickResult + Send>;
type AsyncHandler = Box<dyn FnMut() -> BoxFuture<'static, TickResult> + Send>;

/// The callback a timer invokes on each tick
pub(crate) enum TickHandler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

impl TickHandler {
    pub(crate) fn sync<F>(handler: F) -> Self
    where
        F: FnMut() -> TickResult + Send + 'static,
    {
        Self::Sync(Box::new(handler))
    }

    pub(crate) fn asynchronous<F, Fut>(mut handler: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickResult> + Send + 'static,
    {
        Self::Async(Box::new(move || handler().boxed()))
    }

    /// Begin one invocation. Sync handlers run to completion here; async
    /// handlers only build their future (the caller awaits it after
    /// releasing the handler lock). A panic while calling the handler is
    /// captured as this tick's error.
    pub(crate) fn begin(&mut self) -> TickStep {
        match self {
            Self::Sync(handler) => {
                let outcome = catch_unwind(AssertUnwindSafe(|| handler()));
                TickStep::Done(match outcome {
                    Ok(result) => result,
                    Err(payload) => Err(HandlerPanic::from_payload(payload).into()),
                })
            }
            Self::Async(handler) => match catch_unwind(AssertUnwindSafe(|| handler())) {
                Ok(future) => TickStep::Pending(future),
                Err(payload) => TickStep::Done(Err(HandlerPanic::from_payload(payload).into())),
            },
        }
    }
}

/// A tick invocation that has begun but may not have finished
pub(crate) enum TickStep {
    Done(TickResult),
    Pending(BoxFuture<'static, TickResult>),
}

impl TickStep {
    /// Drive the invocation to its result, capturing panics raised while
    /// the future runs.
    pub(crate) async fn resolve(self) -> TickResult {
        match self {
            Self::Done(result) => result,
            Self::Pending(future) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(HandlerPanic::from_payload(payload).into()),
            },
        }
    }
}
