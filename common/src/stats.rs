// Channel statistics
// Rolling per-(platform, channel) outcome aggregates. Created on the first
// signal observed from a channel, updated by the outcome tracker, read by
// the classifier as a reputation feature. Never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signal::Platform;

/// Execution outcome reported for one signal by the out-of-scope tracker.
/// Outcomes annotate signals, they never mutate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalOutcome {
    pub signal_id: String,
    pub success: bool,
    pub profit_loss_pct: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Rolling aggregate for one source channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelStats {
    pub platform: Platform,
    pub channel: String,
    pub total_signals: u64,
    pub successful: u64,
    pub failed: u64,
    /// Mean profit percentage over successful outcomes
    pub avg_profit_pct: f64,
    /// Mean loss percentage over failed outcomes (negative)
    pub avg_loss_pct: f64,
    /// Sum of all reported profit/loss percentages
    pub net_profit_pct: f64,
    pub last_updated: DateTime<Utc>,
}

impl ChannelStats {
    pub fn new(platform: Platform, channel: String) -> Self {
        Self {
            platform,
            channel,
            total_signals: 0,
            successful: 0,
            failed: 0,
            avg_profit_pct: 0.0,
            avg_loss_pct: 0.0,
            net_profit_pct: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Fold one outcome into the aggregate
    pub fn record(&mut self, success: bool, profit_loss_pct: f64) {
        if success {
            self.successful += 1;
            let n = self.successful as f64;
            self.avg_profit_pct += (profit_loss_pct - self.avg_profit_pct) / n;
        } else {
            self.failed += 1;
            let n = self.failed as f64;
            self.avg_loss_pct += (profit_loss_pct - self.avg_loss_pct) / n;
        }
        self.net_profit_pct += profit_loss_pct;
        self.last_updated = Utc::now();
    }

    /// Note a newly observed signal from this channel
    pub fn observe_signal(&mut self) {
        self.total_signals += 1;
        self.last_updated = Utc::now();
    }

    /// Share of resolved outcomes that were successful; None until the
    /// channel has any resolved outcome
    pub fn success_rate(&self) -> Option<f64> {
        let resolved = self.successful + self.failed;
        if resolved == 0 {
            None
        } else {
            Some(self.successful as f64 / resolved as f64)
        }
    }
}
