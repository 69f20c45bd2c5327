// Pipeline orchestration
// Runs every message through the same fixed enrichment order: extract,
// validate, quality-score, classify, sentiment-adjust, then aggregate.
// Stage failures degrade the affected signal and never abort the batch.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use analysis::{
    AdaptiveClassifier, MlPrediction, QualityScorer, SentimentAnalyzer, SignalValidator,
};
use common::{PipelineSettings, QualityTier, Signal};
use extraction::SignalExtractor;

use crate::aggregator::SignalAggregator;
use crate::outcomes::OutcomeTracker;
use crate::source::{InboundMessage, MessageSource};

/// Maximum points the classifier may move an overall score
const CLASSIFIER_ADJUST_CAP: f64 = 10.0;
/// Classifier score treated as neutral (no adjustment)
const CLASSIFIER_NEUTRAL: f64 = 0.6;

/// One enrichment stage failure. The affected signal stays in the batch
/// with neutral scores; this record says what went wrong and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentFailure {
    pub message_id: String,
    pub signal_id: String,
    pub stage: String,
    pub reason: String,
}

/// What one batch run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Run identifier for log correlation; signal ids stay deterministic
    pub batch_id: Uuid,
    /// Deduplicated, ranked, capped output
    pub signals: Vec<Signal>,
    pub messages_processed: usize,
    pub signals_extracted: usize,
    /// Stage failures behind any neutrally-scored signals
    pub failures: Vec<EnrichmentFailure>,
}

/// Batch report plus per-source fetch failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub batch: BatchReport,
    pub failed_sources: Vec<String>,
}

pub struct SignalPipeline {
    extractor: SignalExtractor,
    validator: SignalValidator,
    scorer: QualityScorer,
    sentiment: SentimentAnalyzer,
    classifier: AdaptiveClassifier,
    aggregator: SignalAggregator,
    tracker: Arc<OutcomeTracker>,
    settings: PipelineSettings,
}

impl SignalPipeline {
    pub fn new(
        extractor: SignalExtractor,
        validator: SignalValidator,
        scorer: QualityScorer,
        sentiment: SentimentAnalyzer,
        classifier: AdaptiveClassifier,
        tracker: Arc<OutcomeTracker>,
        settings: PipelineSettings,
    ) -> Self {
        let aggregator = SignalAggregator::new(settings.max_ranked_signals);
        Self {
            extractor,
            validator,
            scorer,
            sentiment,
            classifier,
            aggregator,
            tracker,
            settings,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            SignalExtractor::with_defaults(),
            SignalValidator::with_defaults(),
            QualityScorer::new(),
            SentimentAnalyzer::with_defaults(),
            AdaptiveClassifier::with_defaults(),
            Arc::new(OutcomeTracker::new()),
            PipelineSettings::default(),
        )
    }

    pub fn tracker(&self) -> &Arc<OutcomeTracker> {
        &self.tracker
    }

    pub fn classifier(&self) -> &AdaptiveClassifier {
        &self.classifier
    }

    /// Extract and fully enrich one message. Returns the enriched signals
    /// in extraction order, before any batch-level dedup or ranking.
    pub fn process_message(
        &self,
        message: &InboundMessage,
    ) -> (Vec<Signal>, Vec<EnrichmentFailure>) {
        let meta = message.meta();
        let mut signals = self.extractor.extract(&message.text, &meta);
        let mut failures = Vec::new();

        for signal in &mut signals {
            self.tracker.observe_signal(signal);
            self.enrich(signal, &message.text, &mut failures);
        }
        (signals, failures)
    }

    /// Run a whole batch: per-message processing, then dedup / rank / cap.
    /// One unparseable or degraded message never affects its neighbors.
    pub fn process_batch(&self, messages: &[InboundMessage]) -> BatchReport {
        let mut enriched = Vec::new();
        let mut failures = Vec::new();
        for message in messages {
            let (signals, message_failures) = self.process_message(message);
            failures.extend(message_failures);
            enriched.extend(signals);
        }

        let signals_extracted = enriched.len();
        let signals = self.aggregator.aggregate(enriched);
        let batch_id = Uuid::new_v4();
        info!(
            batch = %batch_id,
            messages = messages.len(),
            extracted = signals_extracted,
            ranked = signals.len(),
            failures = failures.len(),
            "batch processed"
        );
        BatchReport {
            batch_id,
            signals,
            messages_processed: messages.len(),
            signals_extracted,
            failures,
        }
    }

    /// Fan out to every source with a per-source timeout, then process
    /// whatever arrived. A slow or failing source is reported and skipped.
    pub async fn collect_and_process(
        &self,
        sources: &[Arc<dyn MessageSource>],
    ) -> CollectionReport {
        let timeout = Duration::from_secs(self.settings.source_timeout_secs);
        let mut handles = Vec::new();
        for source in sources {
            let source = Arc::clone(source);
            handles.push(tokio::spawn(async move {
                let name = source.name().to_string();
                let fetched = tokio::time::timeout(timeout, source.fetch_messages()).await;
                (name, fetched)
            }));
        }

        let mut messages = Vec::new();
        let mut failed_sources = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((name, Ok(Ok(batch)))) => {
                    debug!(source = %name, count = batch.len(), "source fetched");
                    messages.extend(batch);
                }
                Ok((name, Ok(Err(err)))) => {
                    warn!(source = %name, error = %err, "source fetch failed");
                    failed_sources.push(name);
                }
                Ok((name, Err(_))) => {
                    warn!(source = %name, ?timeout, "source fetch timed out");
                    failed_sources.push(name);
                }
                Err(err) => {
                    warn!(error = %err, "source task aborted");
                }
            }
        }

        CollectionReport {
            batch: self.process_batch(&messages),
            failed_sources,
        }
    }

    /// Report how a signal resolved; updates channel stats and feeds the
    /// classifier.
    pub fn record_outcome(&self, signal: &Signal, success: bool, profit_loss_pct: f64) {
        self.tracker
            .record_and_train(&self.classifier, signal, success, profit_loss_pct);
    }

    /// Report a resolution by signal id alone. Updates channel stats; the
    /// classifier only learns from outcomes reported with the full signal.
    pub fn record_outcome_by_id(
        &self,
        signal_id: &str,
        success: bool,
        profit_loss_pct: f64,
    ) -> bool {
        self.tracker
            .record_outcome_by_id(signal_id, success, profit_loss_pct)
    }

    /// Convenience passthrough for quality-floored output
    pub fn filter_by_minimum_quality(
        &self,
        signals: Vec<Signal>,
        min_tier: QualityTier,
    ) -> Vec<Signal> {
        self.aggregator.filter_by_minimum_quality(signals, min_tier)
    }

    /// Enrichment order is fixed so scores are reproducible: validation,
    /// quality baseline, bounded classifier adjustment, sentiment last.
    /// A failed stage records a failure and leaves the signal with
    /// neutral scores instead of removing it.
    fn enrich(
        &self,
        signal: &mut Signal,
        original_text: &str,
        failures: &mut Vec<EnrichmentFailure>,
    ) {
        self.validator.validate(signal);

        if let Err(err) = self.scorer.score(signal) {
            warn!(id = %signal.id, error = %err, "quality scoring failed, keeping neutral scores");
            signal.scores.confidence_score = signal.extraction_confidence;
            failures.push(EnrichmentFailure {
                message_id: signal.source.message_id.clone(),
                signal_id: signal.id.clone(),
                stage: "quality".to_string(),
                reason: err.to_string(),
            });
        }

        let stats = self
            .tracker
            .channel_stats(signal.source.platform, &signal.source.channel);
        match self.classifier.predict(signal, original_text, stats.as_ref()) {
            Ok(prediction) => {
                signal.scores.classifier_score = prediction.quality_score;
                let adjust = ((prediction.quality_score - CLASSIFIER_NEUTRAL) * 25.0)
                    .clamp(-CLASSIFIER_ADJUST_CAP, CLASSIFIER_ADJUST_CAP);
                signal.scores.overall_score =
                    (signal.scores.overall_score + adjust).clamp(0.0, 100.0);
                signal.scores.quality_tier = QualityTier::from_score(signal.scores.overall_score);
            }
            Err(err) => {
                warn!(id = %signal.id, error = %err, "classifier failed, prediction rejected");
                failures.push(EnrichmentFailure {
                    message_id: signal.source.message_id.clone(),
                    signal_id: signal.id.clone(),
                    stage: "classifier".to_string(),
                    reason: err.to_string(),
                });
                // degraded shape: zero score, no adjustment to the baseline
                signal.scores.classifier_score = MlPrediction::rejected().quality_score;
            }
        }

        let tone = self.sentiment.analyze(original_text);
        self.sentiment.apply_adjustment(signal, &tone);
    }
}

impl Default for SignalPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Platform;

    fn message(channel: &str, id: &str, text: &str) -> InboundMessage {
        InboundMessage {
            platform: Platform::Telegram,
            channel: channel.to_string(),
            message_id: id.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_process_message_enriches_fully() {
        let pipeline = SignalPipeline::with_defaults();
        let (signals, failures) = pipeline.process_message(&message(
            "alpha_calls",
            "1",
            "BTC LONG Entry: 50000 Targets: 55000, 58000 Stop: 48000",
        ));
        assert!(failures.is_empty());
        assert_eq!(signals.len(), 1);
        let signal = &signals[0];
        assert!(signal.is_valid);
        assert!(signal.scores.overall_score > 0.0);
        assert!(signal.scores.classifier_score > 0.0);
        assert_ne!(signal.scores.quality_tier, QualityTier::Unreliable);
    }

    #[test]
    fn test_junk_message_yields_nothing() {
        let pipeline = SignalPipeline::with_defaults();
        let (signals, _) = pipeline.process_message(&message(
            "alpha_calls",
            "2",
            "gm frens, how is everyone today",
        ));
        assert!(signals.is_empty());
    }

    #[test]
    fn test_batch_isolates_messages() {
        let pipeline = SignalPipeline::with_defaults();
        let report = pipeline.process_batch(&[
            message("alpha_calls", "1", "Long BTC entry 50k target 55k stop 48k"),
            message("alpha_calls", "2", "%%% ??? !!!"),
            message("beta_calls", "3", "ETH looking bullish, target 3500"),
        ]);
        assert_eq!(report.messages_processed, 3);
        assert!(report.signals.iter().any(|s| s.asset == "BTC"));
        assert!(report.signals.iter().any(|s| s.asset == "ETH"));
    }

    #[test]
    fn test_outcome_feedback_path() {
        let pipeline = SignalPipeline::with_defaults();
        let (signals, _) = pipeline.process_message(&message(
            "alpha_calls",
            "1",
            "BTC LONG Entry: 50000 Target: 55000 Stop: 48000",
        ));
        let signal = &signals[0];
        pipeline.record_outcome(signal, true, 8.0);

        let stats = pipeline
            .tracker()
            .channel_stats(Platform::Telegram, "alpha_calls")
            .unwrap();
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.success_rate(), Some(1.0));
    }

    #[test]
    fn test_outcome_by_id_after_signal_is_gone() {
        let pipeline = SignalPipeline::with_defaults();
        let (signals, _) = pipeline.process_message(&message(
            "alpha_calls",
            "1",
            "BTC LONG Entry: 50000 Target: 55000 Stop: 48000",
        ));
        let id = signals[0].id.clone();
        drop(signals);

        assert!(pipeline.record_outcome_by_id(&id, false, -3.0));
        let stats = pipeline
            .tracker()
            .channel_stats(Platform::Telegram, "alpha_calls")
            .unwrap();
        assert_eq!(stats.failed, 1);
        assert!(!pipeline.record_outcome_by_id("not:a:signal", true, 1.0));
    }

    #[tokio::test]
    async fn test_collect_skips_failing_source() {
        use crate::source::StaticSource;

        struct BrokenSource;
        #[async_trait::async_trait]
        impl MessageSource for BrokenSource {
            fn name(&self) -> &str {
                "broken"
            }
            async fn fetch_messages(&self) -> anyhow::Result<Vec<InboundMessage>> {
                anyhow::bail!("connection refused")
            }
        }

        let pipeline = SignalPipeline::with_defaults();
        let good = StaticSource::new(
            "replay",
            vec![message("alpha_calls", "1", "Long BTC entry 50k target 55k")],
        );
        let sources: Vec<Arc<dyn MessageSource>> = vec![Arc::new(good), Arc::new(BrokenSource)];

        let report = pipeline.collect_and_process(&sources).await;
        assert_eq!(report.failed_sources, vec!["broken".to_string()]);
        assert_eq!(report.batch.messages_processed, 1);
        assert!(!report.batch.signals.is_empty());
    }
}
