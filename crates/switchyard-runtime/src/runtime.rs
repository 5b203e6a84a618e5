//! The update loop.
//!
//! Transports push decoded updates into an [`UpdateSender`]; an
//! [`UpdateLoop`] drains the other end and hands each update to the
//! dispatcher until the channel closes or shutdown is requested.
//!
//! ```rust,ignore
//! use switchyard_runtime::{UpdateLoop, update_channel};
//!
//! let config = load_config()?;
//! let dispatcher = router.build(config.dispatch.to_settings());
//! let (tx, rx) = update_channel(config.dispatch.channel_capacity);
//!
//! tokio::spawn(feed_updates(tx));
//! let stats = UpdateLoop::new(dispatcher, bot).run_until_ctrl_c(rx).await;
//! ```

use switchyard_core::{BoxedBot, Update};
use switchyard_framework::{BoxError, Dispatcher};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{RuntimeError, RuntimeResult, TransportError};

/// Producer half of the update channel.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    inner: mpsc::Sender<Update>,
}

impl UpdateSender {
    /// Queues an update, waiting for room if the channel is full.
    pub async fn send(&self, update: Update) -> RuntimeResult<()> {
        self.inner
            .send(update)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

pub type UpdateReceiver = mpsc::Receiver<Update>;

/// Creates a bounded update channel. A capacity of zero is raised to one.
pub fn update_channel(capacity: usize) -> (UpdateSender, UpdateReceiver) {
    let (inner, rx) = mpsc::channel(capacity.max(1));
    (UpdateSender { inner }, rx)
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Updates handed to the dispatcher.
    pub processed: u64,
    /// Updates that arrived carrying a transport error.
    pub errored: u64,
}

/// Feeds updates from a channel into a [`Dispatcher`].
pub struct UpdateLoop {
    dispatcher: Dispatcher,
    bot: BoxedBot,
    shutdown: CancellationToken,
}

impl UpdateLoop {
    pub fn new(dispatcher: Dispatcher, bot: BoxedBot) -> Self {
        Self {
            dispatcher,
            bot,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Token that stops the loop when cancelled.
    ///
    /// Updates still queued in the channel at that point are dropped.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until the channel closes or the shutdown token is cancelled.
    ///
    /// An update whose transport attached an error is reported to the error
    /// sink as a [`TransportError`], without a context, and is then
    /// dispatched like any other.
    pub async fn run(&self, mut updates: UpdateReceiver) -> LoopStats {
        let mut stats = LoopStats::default();
        info!(mode = ?self.dispatcher.mode(), "update loop started");

        loop {
            let update = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("shutdown requested, stopping update loop");
                    break;
                }
                next = updates.recv() => match next {
                    Some(update) => update,
                    None => {
                        debug!("update channel closed");
                        break;
                    }
                },
            };

            if let Some(transport_error) = &update.meta.error {
                stats.errored += 1;
                let err: BoxError = Box::new(TransportError::new(transport_error.clone()));
                self.dispatcher.report_error(&err, None);
            }

            stats.processed += 1;
            self.dispatcher
                .process_update(self.bot.clone(), update)
                .await;
        }

        info!(
            processed = stats.processed,
            errored = stats.errored,
            "update loop stopped"
        );
        stats
    }

    /// Runs until the channel closes, Ctrl+C, or SIGTERM on unix.
    pub async fn run_until_ctrl_c(&self, updates: UpdateReceiver) -> LoopStats {
        let token = self.shutdown.clone();
        let watcher = tokio::spawn(async move {
            wait_for_shutdown().await;
            token.cancel();
        });

        let stats = self.run(updates).await;
        watcher.abort();
        stats
    }
}

impl std::fmt::Debug for UpdateLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateLoop")
            .field("dispatcher", &self.dispatcher)
            .field("bot", &self.bot.me().id)
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = signal::ctrl_c() => log_ctrl_c(result),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                log_ctrl_c(signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    {
        log_ctrl_c(signal::ctrl_c().await);
    }
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "failed to listen for Ctrl+C, shutting down"),
    }
}
