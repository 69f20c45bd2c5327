// Outcome tracking
// Records how signals played out and keeps per-channel aggregates for the
// classifier's reputation feature. Outcomes annotate history; they never
// reach back and mutate an already-emitted signal.

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, warn};

use analysis::AdaptiveClassifier;
use common::{ChannelStats, Platform, Signal, SignalOutcome};

type ChannelKey = (Platform, String);

/// Concurrent store of outcomes and channel aggregates
pub struct OutcomeTracker {
    channels: DashMap<ChannelKey, ChannelStats>,
    outcomes: DashMap<String, SignalOutcome>,
}

impl OutcomeTracker {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            outcomes: DashMap::new(),
        }
    }

    /// Count a freshly extracted signal toward its channel's volume
    pub fn observe_signal(&self, signal: &Signal) {
        let key = (signal.source.platform, signal.source.channel.clone());
        self.channels
            .entry(key)
            .or_insert_with(|| {
                ChannelStats::new(signal.source.platform, signal.source.channel.clone())
            })
            .observe_signal();
    }

    /// Record how a signal resolved. Re-recording the same signal replaces
    /// the stored outcome but folds into channel stats only once.
    pub fn record_outcome(&self, signal: &Signal, success: bool, profit_loss_pct: f64) {
        self.record(
            signal.source.platform,
            &signal.source.channel,
            &signal.id,
            success,
            profit_loss_pct,
        );
    }

    /// Record by signal id alone. Ids carry their source coordinates
    /// (platform:channel:message_id:asset:direction), so channel stats
    /// update without the signal in hand; classifier feedback still needs
    /// it (record_and_train). Returns false for an unrecognized id.
    pub fn record_outcome_by_id(
        &self,
        signal_id: &str,
        success: bool,
        profit_loss_pct: f64,
    ) -> bool {
        let mut parts = signal_id.splitn(3, ':');
        let platform = parts.next().and_then(Platform::parse);
        let channel = parts.next();
        let rest = parts.next();
        match (platform, channel, rest) {
            (Some(platform), Some(channel), Some(rest)) if !channel.is_empty() && !rest.is_empty() => {
                self.record(platform, channel, signal_id, success, profit_loss_pct);
                true
            }
            _ => {
                warn!(id = %signal_id, "outcome for unrecognized signal id ignored");
                false
            }
        }
    }

    fn record(
        &self,
        platform: Platform,
        channel: &str,
        signal_id: &str,
        success: bool,
        profit_loss_pct: f64,
    ) {
        let outcome = SignalOutcome {
            signal_id: signal_id.to_string(),
            success,
            profit_loss_pct,
            recorded_at: Utc::now(),
        };
        let already_recorded = self
            .outcomes
            .insert(signal_id.to_string(), outcome)
            .is_some();
        if already_recorded {
            warn!(id = %signal_id, "outcome re-recorded, channel stats unchanged");
            return;
        }

        self.channels
            .entry((platform, channel.to_string()))
            .or_insert_with(|| ChannelStats::new(platform, channel.to_string()))
            .record(success, profit_loss_pct);
        debug!(id = %signal_id, success, profit_loss_pct, "outcome recorded");
    }

    /// Record an outcome and feed it back into the classifier weights
    pub fn record_and_train(
        &self,
        classifier: &AdaptiveClassifier,
        signal: &Signal,
        success: bool,
        profit_loss_pct: f64,
    ) {
        self.record_outcome(signal, success, profit_loss_pct);
        if let Err(err) = classifier.train_on_feedback(signal, success, profit_loss_pct) {
            warn!(id = %signal.id, error = %err, "classifier feedback skipped");
        }
    }

    pub fn outcome_for(&self, signal_id: &str) -> Option<SignalOutcome> {
        self.outcomes.get(signal_id).map(|o| o.clone())
    }

    pub fn channel_stats(&self, platform: Platform, channel: &str) -> Option<ChannelStats> {
        self.channels
            .get(&(platform, channel.to_string()))
            .map(|s| s.clone())
    }

    /// All channel aggregates, for reporting
    pub fn all_channel_stats(&self) -> Vec<ChannelStats> {
        let mut stats: Vec<ChannelStats> = self.channels.iter().map(|e| e.value().clone()).collect();
        stats.sort_by(|a, b| (a.platform.as_str(), &a.channel).cmp(&(b.platform.as_str(), &b.channel)));
        stats
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }
}

impl Default for OutcomeTracker {
    fn default() -> Self {
        Self::new()
    }
}
