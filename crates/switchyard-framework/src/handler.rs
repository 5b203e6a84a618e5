//! Handlers and the tower service that runs them.
//!
//! A handler is any async function from `Arc<Context>` to
//! `Result<(), BoxError>`. [`HandlerService`] adapts one into a
//! `tower::Service`, and [`BoxedHandler`] is the type-erased form the
//! registry stores once middleware has been stacked on top.
//!
//! ```rust,ignore
//! async fn on_start(ctx: Arc<Context>) -> Result<(), BoxError> {
//!     ctx.bot().call_api("sendMessage", json!({"chat_id": ctx.recipient(), "text": "hi"})).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use switchyard_core::Context;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service};

/// Result type returned by handlers and middleware.
pub type HandlerResult = Result<(), BoxError>;

/// A type-erased, `Clone + Send + Sync` handler chain.
pub type BoxedHandler = BoxCloneSyncService<Arc<Context>, (), BoxError>;

/// Trait for async handler functions.
pub trait Handler: Clone + Send + Sync + 'static {
    fn call(&self, ctx: Arc<Context>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Arc<Context>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Arc<Context>) -> BoxFuture<'static, HandlerResult> {
        (self)(ctx).boxed()
    }
}

/// A tower [`Service`] that calls a single handler.
#[derive(Clone)]
pub struct HandlerService<H> {
    handler: H,
}

impl<H: Handler> HandlerService<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H: Handler> Service<Arc<Context>> for HandlerService<H> {
    type Response = ();
    type Error = BoxError;
    type Future = BoxFuture<'static, HandlerResult>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<Context>) -> Self::Future {
        self.handler.call(ctx)
    }
}

/// Wraps a handler into a [`BoxedHandler`].
pub fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    BoxCloneSyncService::new(HandlerService::new(handler))
}

/// A handler that does nothing and succeeds.
pub fn ignore() -> BoxedHandler {
    boxed(|_ctx: Arc<Context>| async { Ok(()) })
}
