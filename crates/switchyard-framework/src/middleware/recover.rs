//! Panic recovery.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use switchyard_core::Context;
use tower::{BoxError, Layer, Service};
use tracing::warn;

use super::Middleware;
use crate::error::DispatchError;

/// Converts panics in the wrapped chain into [`DispatchError::Panicked`].
///
/// Register it first so it is the outermost layer; the panic then surfaces
/// as an ordinary handler failure that outer code and the error sink see.
pub fn recover() -> Middleware {
    Middleware::from_layer(RecoverLayer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverLayer;

impl<S> Layer<S> for RecoverLayer {
    type Service = RecoverService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecoverService(inner)
    }
}

#[derive(Clone)]
pub struct RecoverService<S>(S);

impl<S> Service<Arc<Context>> for RecoverService<S>
where
    S: Service<Arc<Context>, Response = (), Error = BoxError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = ();
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<(), Self::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.0.poll_ready(cx)
    }

    fn call(&mut self, ctx: Arc<Context>) -> Self::Future {
        let mut inner = self.0.clone();
        let update_id = ctx.update().id;
        async move {
            // `call` itself may panic before a future exists.
            let result = AssertUnwindSafe(async move { inner.call(ctx).await })
                .catch_unwind()
                .await;
            match result {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let err = DispatchError::from_panic(payload);
                    warn!(update_id, error = %err, "recovered from handler panic");
                    Err(err.into())
                }
            }
        }
        .boxed()
    }
}
