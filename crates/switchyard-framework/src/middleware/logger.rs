//! Per-dispatch logging.

use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use switchyard_core::{Context, display_key};
use tower::{BoxError, Layer, Service};
use tracing::{info, warn};

use super::Middleware;

/// Logs every dispatch with its update id, endpoint, outcome and duration.
pub fn logger() -> Middleware {
    Middleware::from_layer(LoggerLayer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerLayer;

impl<S> Layer<S> for LoggerLayer {
    type Service = LoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggerService(inner)
    }
}

#[derive(Clone)]
pub struct LoggerService<S>(S);

impl<S> Service<Arc<Context>> for LoggerService<S>
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
        async move {
            let update_id = ctx.update().id;
            let kind = ctx.update().kind.name();
            let endpoint = display_key(ctx.endpoint());
            let started = Instant::now();

            let result = inner.call(ctx).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => info!(update_id, kind, %endpoint, elapsed_ms, "handled"),
                Err(e) => warn!(update_id, kind, %endpoint, elapsed_ms, error = %e, "handler failed"),
            }
            result
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::boxed;
    use crate::handler::tests::context;
    use crate::middleware::apply;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_logger_is_transparent() {
        let ok = apply(boxed(|_ctx: Arc<Context>| async { Ok(()) }), &[logger()]);
        tokio_test::assert_ok!(ok.oneshot(context(r#"{"update_id": 1}"#, "\u{7}text")).await);

        let failing = apply(
            boxed(|_ctx: Arc<Context>| async { Err("logged".into()) }),
            &[logger()],
        );
        let err = tokio_test::assert_err!(failing.oneshot(context(r#"{"update_id": 2}"#, "/x")).await);
        assert_eq!(err.to_string(), "logged");
    }
}
