//! The serve phase: turning updates into handler calls.
//!
//! A [`Dispatcher`] comes out of [`Router::build`](crate::Router::build) and
//! holds the frozen endpoint table. For each update it:
//!
//! 1. Classifies the update into a [`Plan`](crate::Plan)
//! 2. Walks the plan, skipping keys with no handler
//! 3. Runs each matched chain, stopping after the first exclusive match
//!
//! Chains run either inline ([`DispatchMode::Sync`]) or on a spawned tokio
//! task ([`DispatchMode::Async`]). Either way the caller never sees a
//! handler's outcome: failures and panics go to the error sink.
//!
//! ```rust,ignore
//! let dispatcher = router.build(HandlerSettings::default().synchronous(true));
//! while let Some(update) = updates.recv().await {
//!     dispatcher.process_update(bot.clone(), update).await;
//! }
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use switchyard_core::{BaseContext, BoxedBot, Context, Endpoint, ParseMode, Update, display_key};
use tower::{BoxError, ServiceExt};
use tracing::{debug, trace, warn};

use crate::classifier::{StepMode, classify};
use crate::error::DispatchError;
use crate::handler::BoxedHandler;
use crate::settings::{DispatchMode, HandlerSettings};
use crate::sink::{ErrorSink, default_sink};

/// Routes updates to the handlers registered on a [`Router`](crate::Router).
///
/// Cloning is cheap; clones share the endpoint table.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<HashMap<String, BoxedHandler>>,
    mode: DispatchMode,
    verbose: bool,
    parse_mode: Option<ParseMode>,
    sink: ErrorSink,
}

impl Dispatcher {
    pub(crate) fn from_parts(
        handlers: HashMap<String, BoxedHandler>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            handlers: Arc::new(handlers),
            mode: settings.mode,
            verbose: settings.verbose,
            parse_mode: settings.parse_mode,
            sink: settings.on_error.unwrap_or_else(default_sink),
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn contains(&self, endpoint: impl Into<Endpoint>) -> bool {
        self.handlers.contains_key(&endpoint.into().key())
    }

    /// Registered keys, in no particular order.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Dispatches one update received by `bot`.
    pub async fn process_update(&self, bot: BoxedBot, update: Update) {
        if self.verbose {
            match serde_json::to_string(&update) {
                Ok(json) => debug!(update_id = update.id, update = %json, "incoming update"),
                Err(e) => debug!(update_id = update.id, error = %e, "incoming update"),
            }
        }
        self.process_context(Arc::new(BaseContext::new(bot, update)))
            .await;
    }

    /// Dispatches an update that already has a context.
    pub async fn process_context(&self, base: Arc<BaseContext>) {
        let plan = classify(base.update(), base.bot().me());
        if plan.is_empty() {
            trace!(update_id = base.update().id, "no endpoint for update");
            return;
        }

        for step in plan {
            let Some(handler) = self.handlers.get(step.key()).cloned() else {
                continue;
            };
            let exclusive = step.mode == StepMode::Exclusive;
            let ctx = Context::new(base.clone(), step.route).with_parse_mode(self.parse_mode);
            self.run_handler(handler, Arc::new(ctx)).await;
            if exclusive {
                break;
            }
        }
    }

    /// Runs one chain in the configured mode.
    ///
    /// In sync mode this returns after the chain finishes; in async mode it
    /// returns once the chain is spawned.
    pub async fn run_handler(&self, handler: BoxedHandler, ctx: Arc<Context>) {
        let guarded = guarded(handler, ctx, self.sink.clone());
        match self.mode {
            DispatchMode::Sync => guarded.await,
            DispatchMode::Async => {
                tokio::spawn(guarded);
            }
        }
    }

    /// Runs the handler registered for `endpoint` with `ctx` and returns its
    /// outcome directly, bypassing classification and the error sink.
    pub async fn trigger(
        &self,
        endpoint: impl Into<Endpoint>,
        ctx: Arc<Context>,
    ) -> Result<(), DispatchError> {
        let key = endpoint.into().key();
        let handler = self
            .handlers
            .get(&key)
            .cloned()
            .ok_or(DispatchError::NoHandler(key))?;
        handler.oneshot(ctx).await.map_err(DispatchError::Handler)
    }

    /// Sends a failure to the error sink.
    pub fn report_error(&self, err: &BoxError, ctx: Option<&Context>) {
        (self.sink)(err, ctx);
    }
}

/// Runs `handler` behind a panic boundary and reports any failure.
async fn guarded(handler: BoxedHandler, ctx: Arc<Context>, sink: ErrorSink) {
    let outcome = AssertUnwindSafe(handler.oneshot(ctx.clone()))
        .catch_unwind()
        .await;
    let err: BoxError = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(payload) => {
            let err = DispatchError::from_panic(payload);
            warn!(
                update_id = ctx.update().id,
                endpoint = %display_key(ctx.endpoint()),
                error = %err,
                "handler panicked"
            );
            Box::new(err)
        }
    };
    sink(&err, Some(&ctx));
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoints", &self.handlers.len())
            .field("mode", &self.mode)
            .field("verbose", &self.verbose)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}
