//! The error sink: where handler failures end up.

use std::sync::Arc;

use switchyard_core::Context;
use tower::BoxError;
use tracing::error;

/// Receives every failure a dispatched handler chain returns.
///
/// The context is `None` for failures not tied to a specific update.
pub type ErrorSink = Arc<dyn Fn(&BoxError, Option<&Context>) + Send + Sync>;

/// Logs the failure, tagged with the update id when a context is available.
pub fn default_sink() -> ErrorSink {
    Arc::new(|err: &BoxError, ctx: Option<&Context>| match ctx {
        Some(ctx) => error!(
            update_id = ctx.update().id,
            endpoint = ctx.endpoint(),
            error = %err,
            "handler failed"
        ),
        None => error!(error = %err, "handler failed"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::context;

    #[test]
    fn test_default_sink_tolerates_missing_context() {
        let sink = default_sink();
        let err: BoxError = "lost".into();
        sink(&err, None);
        sink(&err, Some(&context(r#"{"update_id": 3}"#, "/x")));
    }
}
