//! Endpoint registration.
//!
//! The [`Router`] is the build phase: endpoints and middleware are added to
//! it, then [`Router::build`] freezes everything into a [`Dispatcher`]. There
//! is no way back, so nothing can be registered while updates are served.
//!
//! Middleware is resolved when an endpoint is registered. The chain is
//! global middleware, then group middleware (outer groups first), then the
//! middleware passed to `handle_with`, outermost first. Middleware added
//! later does not reach endpoints registered earlier.
//!
//! ```rust,ignore
//! let mut router = Router::new();
//! router.layer(recover()).layer(logger());
//! router.handle("/start", on_start);
//! router.handle(On::Text, on_text);
//!
//! let mut admin = router.group();
//! admin.layer(whitelist([ADMIN_ID]));
//! admin.handle("/ban", on_ban);
//!
//! let dispatcher = router.build(HandlerSettings::default());
//! ```

use std::collections::HashMap;

use switchyard_core::{Endpoint, display_key};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::handler::{BoxedHandler, Handler, boxed};
use crate::middleware::{Middleware, apply, concat};
use crate::settings::HandlerSettings;

/// The mutable endpoint table.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<String, BoxedHandler>,
    middleware: Vec<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds global middleware for endpoints registered after this call.
    pub fn layer(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Registers `handler` for `endpoint` under the global middleware.
    ///
    /// Any string is accepted as a key. An empty string registers fine but
    /// never matches message text.
    pub fn handle<E, H>(&mut self, endpoint: E, handler: H) -> &mut Self
    where
        E: Into<Endpoint>,
        H: Handler,
    {
        self.handle_with(endpoint, handler, std::iter::empty())
    }

    /// Registers `handler` with extra call-site middleware inside the global
    /// chain.
    pub fn handle_with<E, H>(
        &mut self,
        endpoint: E,
        handler: H,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> &mut Self
    where
        E: Into<Endpoint>,
        H: Handler,
    {
        let local: Vec<Middleware> = middleware.into_iter().collect();
        let chain = concat(&self.middleware, &local);
        self.insert(endpoint.into(), apply(boxed(handler), &chain));
        self
    }

    /// Opens a group that inherits the global middleware.
    pub fn group(&mut self) -> Group<'_> {
        Group {
            router: self,
            middleware: Vec::new(),
        }
    }

    /// Registered keys, in no particular order.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn contains(&self, endpoint: impl Into<Endpoint>) -> bool {
        self.handlers.contains_key(&endpoint.into().key())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Freezes the table into a [`Dispatcher`].
    pub fn build(self, settings: HandlerSettings) -> Dispatcher {
        debug!(endpoints = self.handlers.len(), "router built");
        Dispatcher::from_parts(self.handlers, settings)
    }

    fn insert(&mut self, endpoint: Endpoint, handler: BoxedHandler) {
        let key = endpoint.key();
        if self.handlers.insert(key.clone(), handler).is_some() {
            debug!(endpoint = %display_key(&key), "handler replaced");
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("endpoints", &self.handlers.len())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

// ============================================================================
// Group
// ============================================================================

/// A set of endpoints sharing middleware.
///
/// The group's middleware runs inside the router's global middleware and
/// outside any call-site middleware.
pub struct Group<'a> {
    router: &'a mut Router,
    middleware: Vec<Middleware>,
}

impl Group<'_> {
    /// Adds middleware for endpoints this group registers after this call.
    pub fn layer(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn handle<E, H>(&mut self, endpoint: E, handler: H) -> &mut Self
    where
        E: Into<Endpoint>,
        H: Handler,
    {
        self.handle_with(endpoint, handler, std::iter::empty())
    }

    pub fn handle_with<E, H>(
        &mut self,
        endpoint: E,
        handler: H,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> &mut Self
    where
        E: Into<Endpoint>,
        H: Handler,
    {
        let local: Vec<Middleware> = middleware.into_iter().collect();
        let chain = concat(&self.middleware, &local);
        self.router.handle_with(endpoint, handler, chain);
        self
    }

    /// Opens a nested group starting from a copy of this group's middleware.
    pub fn group(&mut self) -> Group<'_> {
        Group {
            middleware: self.middleware.clone(),
            router: &mut *self.router,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::context;
    use crate::middleware::tests::{Trace, trace_handler, trace_middleware};
    use std::sync::Arc;
    use switchyard_core::{Context, InlineButton, On};
    use tower::ServiceExt;

    async fn noop(_ctx: Arc<Context>) -> crate::HandlerResult {
        Ok(())
    }

    #[test]
    fn test_endpoint_kinds_resolve() {
        let mut router = Router::new();
        router
            .handle("/start", noop)
            .handle(On::Photo, noop)
            .handle(&InlineButton::new("like", "👍"), noop);

        assert_eq!(router.len(), 3);
        assert!(router.contains("/start"));
        assert!(router.contains(On::Photo));
        assert!(router.contains("\u{c}like"));
        assert!(!router.contains(On::Text));

        let mut keys: Vec<_> = router.endpoints().collect();
        keys.sort();
        assert_eq!(keys, ["\u{7}photo", "\u{c}like", "/start"]);
    }

    #[test]
    fn test_empty_keys_register() {
        let mut router = Router::new();
        router
            .handle("", noop)
            .handle(&InlineButton::new("", "nameless"), noop);
        assert_eq!(router.len(), 2);
        assert!(router.contains(""));
        assert!(router.contains("\u{c}"));
    }

    #[tokio::test]
    async fn test_reregistering_replaces() {
        let trace: Trace = Default::default();
        let mut router = Router::new();
        router.handle("/x", trace_handler_fn(&trace));
        router.handle_with("/x", noop, [trace_middleware(&trace, "new")]);
        assert_eq!(router.len(), 1);

        let handler = router.handlers["/x"].clone();
        tokio_test::assert_ok!(handler.oneshot(context(r#"{"update_id": 1}"#, "/x")).await);
        assert_eq!(*trace.lock(), ["new:in", "new:out"]);
    }

    #[tokio::test]
    async fn test_global_group_call_site_order() {
        let trace: Trace = Default::default();
        let mut router = Router::new();
        router.layer(trace_middleware(&trace, "g"));
        {
            let mut group = router.group();
            group.layer(trace_middleware(&trace, "p"));
            group.handle_with(
                "/go",
                |_ctx: Arc<Context>| async { Ok(()) },
                [trace_middleware(&trace, "c")],
            );
        }
        let handler = router.handlers["/go"].clone();
        tokio_test::assert_ok!(handler.oneshot(context(r#"{"update_id": 1}"#, "/go")).await);
        assert_eq!(
            *trace.lock(),
            ["g:in", "p:in", "c:in", "c:out", "p:out", "g:out"]
        );
    }

    #[tokio::test]
    async fn test_nested_group_copies_parent() {
        let trace: Trace = Default::default();
        let mut router = Router::new();
        let mut outer = router.group();
        outer.layer(trace_middleware(&trace, "outer"));
        {
            let mut inner = outer.group();
            inner.layer(trace_middleware(&trace, "inner"));
            inner.handle("/deep", trace_handler_fn(&trace));
        }
        outer.handle("/shallow", trace_handler_fn(&trace));

        let deep = router.handlers["/deep"].clone();
        tokio_test::assert_ok!(deep.oneshot(context(r#"{"update_id": 1}"#, "/deep")).await);
        assert_eq!(
            *trace.lock(),
            ["outer:in", "inner:in", "H", "inner:out", "outer:out"]
        );

        trace.lock().clear();
        let shallow = router.handlers["/shallow"].clone();
        tokio_test::assert_ok!(shallow.oneshot(context(r#"{"update_id": 1}"#, "/shallow")).await);
        assert_eq!(*trace.lock(), ["outer:in", "H", "outer:out"]);
    }

    #[tokio::test]
    async fn test_later_layers_do_not_reach_earlier_endpoints() {
        let trace: Trace = Default::default();
        let mut router = Router::new();
        router.handle("/early", trace_handler_fn(&trace));
        router.layer(trace_middleware(&trace, "late"));
        router.handle("/later", trace_handler_fn(&trace));

        let early = router.handlers["/early"].clone();
        tokio_test::assert_ok!(early.oneshot(context(r#"{"update_id": 1}"#, "/early")).await);
        assert_eq!(*trace.lock(), ["H"]);

        trace.lock().clear();
        let later = router.handlers["/later"].clone();
        tokio_test::assert_ok!(later.oneshot(context(r#"{"update_id": 1}"#, "/later")).await);
        assert_eq!(*trace.lock(), ["late:in", "H", "late:out"]);
    }

    fn trace_handler_fn(trace: &Trace) -> impl Handler {
        let handler = trace_handler(trace, "H");
        move |ctx: Arc<Context>| handler.clone().oneshot(ctx)
    }
}
