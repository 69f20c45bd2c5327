// Signal aggregation
// Collapses duplicate ideas within a batch, ranks the survivors, and caps
// the output. Ordering is fully deterministic: overall score descending,
// then id, so identical input batches always rank identically.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use common::{Direction, QualityTier, Signal};

pub struct SignalAggregator {
    max_ranked: usize,
}

impl SignalAggregator {
    pub fn new(max_ranked: usize) -> Self {
        Self { max_ranked }
    }

    /// Dedup, rank, truncate. The same (asset, direction, channel) idea
    /// stated twice in a batch keeps only its best-scored occurrence;
    /// the same idea from different channels stays as corroboration.
    pub fn aggregate(&self, signals: Vec<Signal>) -> Vec<Signal> {
        let before = signals.len();
        let mut best: HashMap<(String, Direction, String), Signal> = HashMap::new();
        for signal in signals {
            match best.entry(signal.dedup_key()) {
                std::collections::hash_map::Entry::Occupied(mut slot) => {
                    if better_than(&signal, slot.get()) {
                        slot.insert(signal);
                    }
                }
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(signal);
                }
            }
        }

        let mut ranked: Vec<Signal> = best.into_values().collect();
        ranked.sort_by(rank_order);
        if ranked.len() > self.max_ranked {
            ranked.truncate(self.max_ranked);
        }
        debug!(before, after = ranked.len(), "batch aggregated");
        ranked
    }

    /// Keep only signals at or above the given quality tier, preserving order
    pub fn filter_by_minimum_quality(
        &self,
        signals: Vec<Signal>,
        min_tier: QualityTier,
    ) -> Vec<Signal> {
        signals
            .into_iter()
            .filter(|s| s.scores.quality_tier.rank() >= min_tier.rank())
            .collect()
    }
}

fn better_than(candidate: &Signal, incumbent: &Signal) -> bool {
    match candidate
        .scores
        .overall_score
        .partial_cmp(&incumbent.scores.overall_score)
    {
        Some(Ordering::Greater) => true,
        Some(Ordering::Less) => false,
        // ties break on id so dedup does not depend on batch order
        _ => candidate.id < incumbent.id,
    }
}

fn rank_order(a: &Signal, b: &Signal) -> Ordering {
    b.scores
        .overall_score
        .partial_cmp(&a.scores.overall_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ExtractionTier, Platform, SourceInfo};

    fn make_signal(channel: &str, message_id: &str, asset: &str, overall: f64) -> Signal {
        let source = SourceInfo {
            platform: Platform::Telegram,
            channel: channel.to_string(),
            message_id: message_id.to_string(),
            raw_text: "text".to_string(),
            cleaned_text: "text".to_string(),
            // fixed timestamp so equal batches compare equal regardless of wall clock
            timestamp: chrono::DateTime::UNIX_EPOCH,
        };
        let mut signal = Signal::new(
            source,
            asset.to_string(),
            Direction::Long,
            ExtractionTier::FullSignal,
        );
        signal.scores.overall_score = overall;
        signal.scores.quality_tier = QualityTier::from_score(overall);
        signal
    }

    #[test]
    fn test_same_channel_duplicates_keep_best() {
        let aggregator = SignalAggregator::new(100);
        let ranked = aggregator.aggregate(vec![
            make_signal("alpha_calls", "1", "BTC", 62.0),
            make_signal("alpha_calls", "2", "BTC", 78.0),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].scores.overall_score, 78.0);
    }

    #[test]
    fn test_cross_channel_signals_survive() {
        let aggregator = SignalAggregator::new(100);
        let ranked = aggregator.aggregate(vec![
            make_signal("alpha_calls", "1", "BTC", 70.0),
            make_signal("beta_calls", "1", "BTC", 70.0),
        ]);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_and_truncate() {
        let aggregator = SignalAggregator::new(2);
        let ranked = aggregator.aggregate(vec![
            make_signal("a", "1", "BTC", 55.0),
            make_signal("b", "1", "ETH", 90.0),
            make_signal("c", "1", "SOL", 72.0),
        ]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].asset, "ETH");
        assert_eq!(ranked[1].asset, "SOL");
    }

    #[test]
    fn test_rank_is_deterministic_under_shuffle() {
        let aggregator = SignalAggregator::new(100);
        let forward = aggregator.aggregate(vec![
            make_signal("a", "1", "BTC", 70.0),
            make_signal("b", "1", "ETH", 70.0),
            make_signal("c", "1", "SOL", 70.0),
        ]);
        let reversed = aggregator.aggregate(vec![
            make_signal("c", "1", "SOL", 70.0),
            make_signal("b", "1", "ETH", 70.0),
            make_signal("a", "1", "BTC", 70.0),
        ]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_quality_floor() {
        let aggregator = SignalAggregator::new(100);
        let ranked = aggregator.aggregate(vec![
            make_signal("a", "1", "BTC", 88.0),
            make_signal("b", "1", "ETH", 45.0),
        ]);
        let kept = aggregator.filter_by_minimum_quality(ranked, QualityTier::Basic);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].asset, "BTC");
    }
}
