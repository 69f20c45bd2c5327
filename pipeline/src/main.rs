use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, Level};

use common::Platform;
use pipeline::{InboundMessage, MessageSource, SignalPipeline, StaticSource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("📡 Starting signal pipeline");

    let pipeline = SignalPipeline::with_defaults();

    // Replay batch standing in for live platform connectors
    let replay = StaticSource::new(
        "replay",
        vec![
            message(
                "alpha_calls",
                "1001",
                "🚀 BTC LONG! Entry: 50000 Targets: 55000, 58000 Stop loss: 48000 Leverage: 10x",
            ),
            message(
                "vip_signals",
                "1002",
                "SIGNAL ID: #1956 COIN: $BTC/USDT (3-5x) Direction: LONG \
                 ENTRY: 112207-110500 TARGETS: 113500-114800-117000 STOP LOSS: 109638",
            ),
            message("beta_calls", "1003", "ETH looking bullish, breaking resistance, target 3500"),
            message("beta_calls", "1004", "gm frens ☀️"),
        ],
    );
    let sources: Vec<Arc<dyn MessageSource>> = vec![Arc::new(replay)];

    let report = pipeline.collect_and_process(&sources).await;
    info!(
        batch = %report.batch.batch_id,
        messages = report.batch.messages_processed,
        ranked = report.batch.signals.len(),
        "✅ batch complete"
    );

    for signal in &report.batch.signals {
        println!("{}", serde_json::to_string_pretty(signal)?);
    }
    Ok(())
}

fn message(channel: &str, id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        platform: Platform::Telegram,
        channel: channel.to_string(),
        message_id: id.to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}
