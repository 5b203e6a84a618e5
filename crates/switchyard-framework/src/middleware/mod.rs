//! Middleware and chain composition.
//!
//! A [`Middleware`] is a type-erased tower layer over [`BoxedHandler`]: it
//! takes the rest of the chain and returns a handler wrapping it. Any tower
//! [`Layer`] whose service fits the handler bounds converts into one with
//! [`Middleware::from_layer`]; [`from_fn`] builds one from an async closure.
//!
//! Chains nest like call frames. For `[m1, m2]` around `h` the order is
//! `m1:in, m2:in, h, m2:out, m1:out`:
//!
//! ```text
//! apply(h, [m1, m2, .., mn]) = m1(m2(..mn(h)..))
//! ```
//!
//! ```rust,ignore
//! let timing = from_fn(|ctx, next| async move {
//!     let started = Instant::now();
//!     let result = next.run(ctx).await;
//!     debug!(elapsed_ms = started.elapsed().as_millis() as u64, "done");
//!     result
//! });
//! router.layer(timing);
//! ```

mod logger;
mod recover;
mod restrict;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use switchyard_core::Context;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service, ServiceExt};
use tower_layer::{Layer, layer_fn};

use crate::handler::{BoxedHandler, HandlerResult};

pub use logger::{LoggerLayer, LoggerService, logger};
pub use recover::{RecoverLayer, RecoverService, recover};
pub use restrict::{blacklist, ignore_via_bots, restrict, whitelist};

/// A composable handler decorator.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>);

impl Middleware {
    /// Creates a middleware from a function over boxed handlers.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Converts a tower layer into a middleware.
    pub fn from_layer<L>(layer: L) -> Self
    where
        L: Layer<BoxedHandler> + Send + Sync + 'static,
        L::Service: Service<Arc<Context>, Response = (), Error = BoxError>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Arc<Context>>>::Future: Send + 'static,
    {
        Self::new(move |inner| BoxCloneSyncService::new(layer.layer(inner)))
    }

    /// Wraps `inner` in this middleware.
    pub fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        (self.0)(inner)
    }
}

impl Layer<BoxedHandler> for Middleware {
    type Service = BoxedHandler;

    fn layer(&self, inner: BoxedHandler) -> Self::Service {
        self.wrap(inner)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Wraps `handler` in `middleware`, first element outermost.
pub fn apply(handler: BoxedHandler, middleware: &[Middleware]) -> BoxedHandler {
    middleware
        .iter()
        .rev()
        .fold(handler, |inner, m| m.wrap(inner))
}

/// Concatenates two middleware lists into a freshly allocated one.
///
/// Neither input is modified, so chains built from `a` earlier never see
/// later additions.
pub fn concat(a: &[Middleware], b: &[Middleware]) -> Vec<Middleware> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

// ============================================================================
// from_fn
// ============================================================================

/// The rest of the chain, as seen from a [`from_fn`] middleware.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the rest of the chain.
    pub async fn run(self, ctx: Arc<Context>) -> HandlerResult {
        self.inner.oneshot(ctx).await
    }
}

/// Builds a middleware from an async function of `(ctx, next)`.
///
/// Not calling `next.run` short-circuits the chain.
pub fn from_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(Arc<Context>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let f = Arc::new(f);
    Middleware::from_layer(layer_fn(move |inner: BoxedHandler| FromFnService {
        f: f.clone(),
        inner,
    }))
}

struct FromFnService<F> {
    f: Arc<F>,
    inner: BoxedHandler,
}

impl<F> Clone for FromFnService<F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<F, Fut> Service<Arc<Context>> for FromFnService<F>
where
    F: Fn(Arc<Context>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    type Response = ();
    type Error = BoxError;
    type Future = BoxFuture<'static, HandlerResult>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<Context>) -> Self::Future {
        let next = Next {
            inner: self.inner.clone(),
        };
        (self.f)(ctx, next).boxed()
    }
}
