//! Echo Bot Example
//!
//! Replays recorded updates (one JSON object per line) through a Switchyard
//! dispatcher. The bot is offline, so every reply it attempts is logged as a
//! failed API call; the interesting part is which handler answers what.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- --input updates.ndjson
//! cat updates.ndjson | cargo run --package echo-bot -- --allow 7,8
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::{Value, json};
use switchyard::prelude::*;
use switchyard::runtime::{ConfigLoader, UpdateSender};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "echo-bot", about = "Replay recorded updates through an echo bot")]
struct Args {
    /// Newline-delimited update JSON; stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Configuration file to load on top of the defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spawn each handler instead of replaying strictly in order.
    #[arg(long)]
    concurrent: bool,

    /// Only answer these user ids.
    #[arg(long, value_delimiter = ',')]
    allow: Vec<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

fn like_button() -> InlineButton {
    InlineButton::new("like", "👍").with_data("echo")
}

async fn reply(ctx: &Context, text: &str, markup: Option<Value>) {
    let Some(chat_id) = ctx.recipient() else {
        return;
    };

    let mut params = json!({ "chat_id": chat_id, "text": text });
    if let Some(mode) = ctx.parse_mode() {
        params["parse_mode"] = json!(mode.as_str());
    }
    if let Some(markup) = markup {
        params["reply_markup"] = markup;
    }

    if let Err(e) = ctx.bot().call_api("sendMessage", params).await {
        error!(chat_id, error = %e, "failed to send reply");
    }
}

async fn start(ctx: Arc<Context>) -> HandlerResult {
    let button = like_button();
    let keyboard = json!({
        "inline_keyboard": [[{ "text": button.text, "callback_data": button.callback_data() }]]
    });
    let greeting = match ctx.data() {
        "" => "Send me anything and I'll send it back.".to_owned(),
        payload => format!("Started with {payload:?}. Send me anything."),
    };
    reply(&ctx, &greeting, Some(keyboard)).await;
    Ok(())
}

async fn ping(ctx: Arc<Context>) -> HandlerResult {
    reply(&ctx, "Pong!", None).await;
    Ok(())
}

async fn echo(ctx: Arc<Context>) -> HandlerResult {
    reply(&ctx, ctx.text(), None).await;
    Ok(())
}

async fn sticker(ctx: Arc<Context>) -> HandlerResult {
    reply(&ctx, "Nice sticker.", None).await;
    Ok(())
}

async fn liked(ctx: Arc<Context>) -> HandlerResult {
    let user = ctx.sender().map(|u| u.id);
    info!(?user, data = ctx.data(), "like pressed");

    if let Some(callback) = ctx.callback() {
        let params = json!({ "callback_query_id": callback.id, "text": "Thanks!" });
        if let Err(e) = ctx.bot().call_api("answerCallbackQuery", params).await {
            error!(error = %e, "failed to answer callback");
        }
    }
    Ok(())
}

async fn joined(ctx: Arc<Context>) -> HandlerResult {
    if let Some(user) = ctx.joined_user() {
        let welcome = format!("Welcome, {}!", user.first_name);
        reply(&ctx, &welcome, None).await;
    }
    Ok(())
}

fn router(args: &Args) -> Router {
    let mut router = Router::new();
    router.layer(logger()).layer(recover()).layer(ignore_via_bots());
    if !args.allow.is_empty() {
        router.layer(whitelist(args.allow.iter().copied()));
    }

    router
        .handle("/start", start)
        .handle("/ping", ping)
        .handle(On::Text, echo)
        .handle(On::Sticker, sticker)
        .handle(On::UserJoined, joined)
        .handle(&like_button(), liked);
    router
}

// ============================================================================
// Update feed
// ============================================================================

async fn feed<R>(reader: R, tx: UpdateSender) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Update>(line) {
            Ok(update) => tx.send(update).await?,
            Err(e) => warn!(error = %e, "skipping malformed update"),
        }
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_current_dir();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    config.dispatch.synchronous = !args.concurrent;
    init_from_config(&config.logging)?;

    let dispatcher = router(&args).build(config.dispatch.to_settings());
    let bot = OfflineBot::from_config(&config.bot).boxed();
    let (tx, rx) = update_channel(config.dispatch.channel_capacity);

    let producer = match args.input {
        Some(path) => {
            let file = File::open(&path).await?;
            tokio::spawn(feed(BufReader::new(file), tx))
        }
        None => tokio::spawn(feed(BufReader::new(tokio::io::stdin()), tx)),
    };

    let stats = UpdateLoop::new(dispatcher, bot).run_until_ctrl_c(rx).await;
    producer.abort();
    if let Ok(Err(e)) = producer.await {
        warn!(error = %e, "update feed stopped early");
    }

    info!(
        processed = stats.processed,
        errored = stats.errored,
        "replay finished"
    );
    Ok(())
}
