// End-to-end runs over realistic source messages: one message in, enriched
// ranked signals out, with the failure-isolation and reproducibility
// guarantees the pipeline makes for whole batches.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use analysis::{AdaptiveClassifier, QualityScorer, SentimentAnalyzer, SignalValidator};
use common::{
    Direction, EntryPrice, ExtractionTier, PipelineSettings, Platform, QualityTier, Severity,
};
use extraction::SignalExtractor;
use pipeline::{InMemorySignalStore, InboundMessage, OutcomeTracker, SignalPipeline};
use rust_decimal_macros::dec;

fn fixed_time() -> DateTime<Utc> {
    "2026-08-24T12:00:00Z".parse().unwrap()
}

fn telegram(channel: &str, id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        platform: Platform::Telegram,
        channel: channel.to_string(),
        message_id: id.to_string(),
        text: text.to_string(),
        timestamp: fixed_time(),
    }
}

fn capped_pipeline(max_ranked: usize) -> SignalPipeline {
    SignalPipeline::new(
        SignalExtractor::with_defaults(),
        SignalValidator::with_defaults(),
        QualityScorer::new(),
        SentimentAnalyzer::with_defaults(),
        AdaptiveClassifier::with_defaults(),
        Arc::new(OutcomeTracker::new()),
        PipelineSettings {
            max_ranked_signals: max_ranked,
            ..PipelineSettings::default()
        },
    )
}

#[test]
fn full_telegram_signal_comes_out_ranked_and_valid() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[telegram(
        "alpha_calls",
        "1",
        "🚀 BTC LONG! Entry: 50000 Targets: 55000, 58000 Stop loss: 48000 Leverage: 10x",
    )]);

    assert_eq!(report.signals.len(), 1);
    let signal = &report.signals[0];
    assert_eq!(signal.asset, "BTC");
    assert_eq!(signal.direction, Direction::Long);
    assert_eq!(signal.entry, EntryPrice::Price(dec!(50000)));
    assert_eq!(signal.targets, vec![dec!(55000), dec!(58000)]);
    assert!(signal.is_valid);
    assert!(signal.scores.risk_reward_ratio > 2.0);
    assert!(signal.scores.overall_score > 50.0);
    assert_ne!(signal.scores.quality_tier, QualityTier::Unreliable);
}

#[test]
fn inverted_short_is_kept_but_flagged_invalid() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[telegram(
        "alpha_calls",
        "2",
        "ETH SHORT Entry: 3000 Target: 3200 Stop: 2800",
    )]);

    // validation annotates, it never drops the signal from the batch
    assert_eq!(report.signals.len(), 1);
    let signal = &report.signals[0];
    assert!(!signal.is_valid);
    assert!(signal
        .validation
        .iter()
        .any(|f| f.severity == Severity::Critical && f.field == "targets"));
    assert!(signal
        .validation
        .iter()
        .any(|f| f.severity == Severity::Critical && f.field == "stop_loss"));
    // broken price logic carries no defined risk/reward
    assert_eq!(signal.scores.risk_reward_ratio, 0.0);
}

#[test]
fn unknown_ticker_never_reaches_output() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[telegram(
        "alpha_calls",
        "3",
        "XYZABC LONG Entry: 100 Target: 120",
    )]);
    assert!(report.signals.is_empty());
    assert_eq!(report.messages_processed, 1);
}

#[test]
fn structured_block_takes_the_fast_path() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[telegram(
        "vip_signals",
        "4",
        "SIGNAL ID: #1956 COIN: $BTC/USDT (3-5x) Direction: LONG \
         ENTRY: 112207-110500 TARGETS: 113500-114800-117000 STOP LOSS: 109638",
    )]);

    assert_eq!(report.signals.len(), 1);
    let signal = &report.signals[0];
    assert_eq!(signal.extraction_tier, ExtractionTier::Structured);
    assert_eq!(signal.extraction_confidence, 95.0);
    assert_eq!(signal.targets.len(), 3);
    assert!(signal.is_valid);
}

#[test]
fn one_bad_message_never_sinks_the_batch() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[
        telegram("alpha_calls", "1", "BTC LONG Entry: 50000 Target: 55000 Stop: 48000"),
        telegram("alpha_calls", "2", "🔥🔥🔥 %%% ??? unintelligible 🔥🔥🔥"),
        telegram("beta_calls", "3", "ETH looking bullish, breaking resistance, target 3500"),
    ]);

    assert_eq!(report.messages_processed, 3);
    let assets: Vec<&str> = report.signals.iter().map(|s| s.asset.as_str()).collect();
    assert!(assets.contains(&"BTC"));
    assert!(assets.contains(&"ETH"));
}

#[test]
fn same_idea_in_one_channel_deduplicates_to_best() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[
        telegram("alpha_calls", "1", "BTC heading to 100k"),
        telegram(
            "alpha_calls",
            "2",
            "Update: BUY BTC Entry: 95000 Target: 100000 Stop: 92000",
        ),
    ]);

    let btc: Vec<_> = report
        .signals
        .iter()
        .filter(|s| s.asset == "BTC" && s.direction == Direction::Buy)
        .collect();
    assert_eq!(btc.len(), 1);
    assert_eq!(btc[0].source.message_id, "2");
}

#[test]
fn ranked_output_is_capped() {
    let pipeline = capped_pipeline(2);
    let report = pipeline.process_batch(&[
        telegram("a", "1", "BTC LONG Entry: 50000 Target: 55000 Stop: 48000"),
        telegram("b", "2", "ETH LONG Entry: 3000 Target: 3300 Stop: 2900"),
        telegram("c", "3", "SOL heading to 200"),
    ]);
    assert_eq!(report.signals_extracted, 3);
    assert_eq!(report.signals.len(), 2);
    // survivors are ordered best first
    assert!(report.signals[0].scores.overall_score >= report.signals[1].scores.overall_score);
}

#[test]
fn reprocessing_the_same_batch_is_byte_identical() {
    let messages = vec![
        telegram("alpha_calls", "1", "BTC LONG Entry: 50000 Targets: 55000, 58000 Stop: 48000"),
        telegram("beta_calls", "2", "ETH SHORT Entry: 3000 Target: 2800 Stop: 3100"),
        telegram("gamma", "3", "SOL looking bullish, support holding"),
    ];

    let first = SignalPipeline::with_defaults().process_batch(&messages);
    let second = SignalPipeline::with_defaults().process_batch(&messages);

    let a = serde_json::to_string(&first.signals).unwrap();
    let b = serde_json::to_string(&second.signals).unwrap();
    assert_eq!(a, b);
}

#[test]
fn quality_floor_filters_ranked_output() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[
        telegram("alpha_calls", "1", "BTC LONG Entry: 50000 Target: 55000 Stop: 48000"),
        telegram("beta_calls", "2", "DOGE heading to 1"),
    ]);

    let floored = pipeline.filter_by_minimum_quality(report.signals.clone(), QualityTier::Basic);
    assert!(floored.len() < report.signals.len() || floored.iter().all(|s| {
        s.scores.quality_tier.rank() >= QualityTier::Basic.rank()
    }));
    assert!(floored.iter().any(|s| s.asset == "BTC"));
}

#[test]
fn outcomes_raise_channel_reputation_for_later_batches() {
    let pipeline = SignalPipeline::with_defaults();
    let text = "BTC LONG Entry: 50000 Target: 55000 Stop: 48000";

    let first = pipeline.process_batch(&[telegram("alpha_calls", "1", text)]);
    let baseline = first.signals[0].scores.classifier_score;

    for n in 0..5 {
        pipeline.record_outcome(&first.signals[0], true, 4.0 + n as f64);
    }
    // same id resolves once; use fresh ids to accumulate wins
    for n in 2..6 {
        let batch = pipeline.process_batch(&[telegram("alpha_calls", &n.to_string(), text)]);
        pipeline.record_outcome(&batch.signals[0], true, 5.0);
    }

    let later = pipeline.process_batch(&[telegram("alpha_calls", "99", text)]);
    assert!(later.signals[0].scores.classifier_score > baseline);
}

#[test]
fn store_round_trips_enriched_signals() {
    let pipeline = SignalPipeline::with_defaults();
    let report = pipeline.process_batch(&[telegram(
        "alpha_calls",
        "1",
        "BTC LONG Entry: 50000 Target: 55000 Stop: 48000",
    )]);

    let store = InMemorySignalStore::new();
    for signal in &report.signals {
        assert!(store.upsert(signal.clone()));
    }
    // reprocessing upserts the same ids without growing the store
    for signal in &report.signals {
        assert!(!store.upsert(signal.clone()));
    }
    assert_eq!(store.len(), report.signals.len());

    let stored = store.get(&report.signals[0].id).unwrap();
    let json = serde_json::to_string(&stored).unwrap();
    let back: common::Signal = serde_json::from_str(&json).unwrap();
    assert_eq!(stored, back);
}
