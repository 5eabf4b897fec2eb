use std::sync::Arc;

use anyhow::Context;

use signal_listener::channels::{Channel, CliChannel, TelegramChannel};
use signal_listener::config::ListenerConfig;
use signal_listener::pipeline::{ProcessorDeps, SignalProcessor};
use signal_listener::sinks::{ApiDispatcher, SignalLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(writer)
        .init();

    let config = ListenerConfig::from_env().context("Invalid listener configuration")?;

    eprintln!("📡 Signal Listener v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Channel: {}", config.channel);
    eprintln!("   API endpoint: {}", config.api_url);
    eprintln!("   Signal log: {}", config.log_path.display());

    // ── Channel ─────────────────────────────────────────────────────────
    let channel: Box<dyn Channel> = match config.bot_token.clone() {
        Some(token) => {
            eprintln!("   Source: telegram");
            Box::new(TelegramChannel::new(token, &config.channel))
        }
        None => {
            eprintln!("   Source: stdin (TELEGRAM_BOT_TOKEN not set)");
            Box::new(CliChannel::new())
        }
    };

    if let Err(e) = channel.health_check().await {
        tracing::warn!(error = %e, "Could not get channel info");
    }

    // ── Sinks ───────────────────────────────────────────────────────────
    let dispatcher = ApiDispatcher::new(config.api_url.clone(), config.http_timeout)
        .context("Failed to create API dispatcher")?;
    let deps = ProcessorDeps {
        dispatcher: Arc::new(dispatcher),
        log: Arc::new(SignalLog::new(config.log_path.clone())),
    };
    let processor = SignalProcessor::new(deps);

    // ── Run ─────────────────────────────────────────────────────────────
    let stream = channel
        .start()
        .await
        .with_context(|| format!("Failed to start {} channel", channel.name()))?;

    processor.run(stream).await;

    channel.shutdown().await?;
    Ok(())
}
