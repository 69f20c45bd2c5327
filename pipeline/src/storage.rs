// Signal store
// In-memory keyed store for enriched signals. Insertion is idempotent by
// signal id, so reprocessing the same messages leaves the store unchanged.

use dashmap::DashMap;

use common::{Platform, QualityTier, Signal};

pub struct InMemorySignalStore {
    signals: DashMap<String, Signal>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self {
            signals: DashMap::new(),
        }
    }

    /// Insert or replace by id. Returns true when the id was new.
    pub fn upsert(&self, signal: Signal) -> bool {
        self.signals.insert(signal.id.clone(), signal).is_none()
    }

    pub fn get(&self, id: &str) -> Option<Signal> {
        self.signals.get(id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Stored signals at or above a minimum quality tier, best first
    pub fn by_minimum_quality(&self, min_tier: QualityTier) -> Vec<Signal> {
        self.collect_sorted(|s| s.scores.quality_tier.rank() >= min_tier.rank())
    }

    /// Stored signals for one asset, best first
    pub fn by_asset(&self, asset: &str) -> Vec<Signal> {
        self.collect_sorted(|s| s.asset == asset)
    }

    /// Stored signals from one channel, best first
    pub fn by_channel(&self, platform: Platform, channel: &str) -> Vec<Signal> {
        self.collect_sorted(|s| s.source.platform == platform && s.source.channel == channel)
    }

    fn collect_sorted(&self, keep: impl Fn(&Signal) -> bool) -> Vec<Signal> {
        let mut matching: Vec<Signal> = self
            .signals
            .iter()
            .filter(|s| keep(s))
            .map(|s| s.clone())
            .collect();
        matching.sort_by(|a, b| {
            b.scores
                .overall_score
                .partial_cmp(&a.scores.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matching
    }
}

impl Default for InMemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Direction, ExtractionTier, Platform, SourceInfo};

    fn make_signal(message_id: &str, overall: f64, tier: QualityTier) -> Signal {
        let source = SourceInfo {
            platform: Platform::Telegram,
            channel: "alpha_calls".to_string(),
            message_id: message_id.to_string(),
            raw_text: "BTC LONG".to_string(),
            cleaned_text: "BTC LONG".to_string(),
            timestamp: Utc::now(),
        };
        let mut signal = Signal::new(
            source,
            "BTC".to_string(),
            Direction::Long,
            ExtractionTier::FullSignal,
        );
        signal.scores.overall_score = overall;
        signal.scores.quality_tier = tier;
        signal
    }

    #[test]
    fn test_upsert_is_idempotent_by_id() {
        let store = InMemorySignalStore::new();
        assert!(store.upsert(make_signal("1", 75.0, QualityTier::Good)));
        assert!(!store.upsert(make_signal("1", 75.0, QualityTier::Good)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quality_filter_and_order() {
        let store = InMemorySignalStore::new();
        store.upsert(make_signal("1", 88.0, QualityTier::Excellent));
        store.upsert(make_signal("2", 55.0, QualityTier::Basic));
        store.upsert(make_signal("3", 74.0, QualityTier::Good));

        let good_or_better = store.by_minimum_quality(QualityTier::Good);
        assert_eq!(good_or_better.len(), 2);
        assert_eq!(good_or_better[0].source.message_id, "1");
        assert_eq!(good_or_better[1].source.message_id, "3");
    }

    #[test]
    fn test_asset_and_channel_lookups() {
        let store = InMemorySignalStore::new();
        store.upsert(make_signal("1", 80.0, QualityTier::Good));
        store.upsert(make_signal("2", 60.0, QualityTier::Basic));

        let btc = store.by_asset("BTC");
        assert_eq!(btc.len(), 2);
        assert!(btc[0].scores.overall_score >= btc[1].scores.overall_score);
        assert!(store.by_asset("ETH").is_empty());

        assert_eq!(store.by_channel(Platform::Telegram, "alpha_calls").len(), 2);
        assert!(store.by_channel(Platform::Reddit, "alpha_calls").is_empty());
    }
}
