//! Access restriction by sender, and inline-bot filtering.

use std::collections::HashSet;
use std::sync::Arc;

use switchyard_core::Context;
use tower::ServiceExt;

use super::{Middleware, from_fn};
use crate::handler::{BoxedHandler, boxed, ignore};

/// Routes each update to `allowed` when its sender is in `chats`, and to
/// `denied` otherwise. `None` on either side means the rest of the chain.
pub fn restrict(
    chats: impl IntoIterator<Item = i64>,
    allowed: Option<BoxedHandler>,
    denied: Option<BoxedHandler>,
) -> Middleware {
    let chats: Arc<HashSet<i64>> = Arc::new(chats.into_iter().collect());
    Middleware::new(move |next: BoxedHandler| {
        let chats = chats.clone();
        let allowed = allowed.clone().unwrap_or_else(|| next.clone());
        let denied = denied.clone().unwrap_or(next);
        boxed(move |ctx: Arc<Context>| {
            let listed = ctx.sender().is_some_and(|u| chats.contains(&u.id));
            let target = if listed { &allowed } else { &denied };
            target.clone().oneshot(ctx)
        })
    })
}

/// Lets only the listed senders through; everyone else is ignored.
pub fn whitelist(chats: impl IntoIterator<Item = i64>) -> Middleware {
    restrict(chats, None, Some(ignore()))
}

/// Ignores the listed senders.
pub fn blacklist(chats: impl IntoIterator<Item = i64>) -> Middleware {
    restrict(chats, Some(ignore()), None)
}

/// Ignores messages sent via an inline bot.
pub fn ignore_via_bots() -> Middleware {
    from_fn(|ctx, next| async move {
        if ctx.message().is_some_and(|m| m.via_bot.is_some()) {
            return Ok(());
        }
        next.run(ctx).await
    })
}
