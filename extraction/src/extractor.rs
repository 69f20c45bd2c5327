// Tiered Signal Extractor
// Ties the pieces together for one message: normalize, try the structured
// fast path, fall back to the heuristic cascade, gate every candidate
// against the ticker whitelist, and collapse duplicates. Extraction owns
// the whitelist gate and the confidence floor; validation never drops.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use tracing::debug;

use common::{
    AssetCatalog, EntryPrice, ExtractionTier, PipelineSettings, Platform, Signal, SourceInfo,
    VenueCatalog,
};

use crate::cascade::{run_cascade, CascadeCandidate};
use crate::normalizer::normalize_text;
use crate::price::ParsedPrice;
use crate::structured::parse_structured;

lazy_static! {
    /// All-caps trading jargon and filler that must never be treated as a
    /// ticker candidate
    static ref STOPWORDS: HashSet<&'static str> = [
        "LONG", "SHORT", "BUY", "SELL", "HOLD", "ENTRY", "ENTRIES", "ENTER", "TARGET",
        "TARGETS", "STOP", "LOSS", "SL", "TP", "TP1", "TP2", "TP3", "LEVERAGE", "LEV",
        "COIN", "PAIR", "SIGNAL", "ID", "ZONE", "PRICE", "DIRECTION", "SIDE", "USD",
        "USDT", "USDC", "BUSD", "PERP", "RSI", "MACD", "EMA", "SMA", "ATH", "ATL",
        "PUMP", "DUMP", "MOON", "HODL", "DYOR", "NFA", "IMO", "IMHO", "GM", "GN",
        "THE", "AND", "FOR", "NOW", "NOT", "ALL", "NEW", "TOP", "LOW", "HIGH", "SEE",
        "LOL", "WTF", "ASAP", "TF", "HTF", "LTF", "DCA", "OK", "YOLO", "FOMO", "FUD",
    ]
    .into_iter()
    .collect();
}

/// Message metadata supplied by the source collaborators
#[derive(Debug, Clone)]
pub struct MessageMeta {
    pub platform: Platform,
    pub channel: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Extracts candidate signals from one message at a time
pub struct SignalExtractor {
    catalog: AssetCatalog,
    venues: VenueCatalog,
    settings: PipelineSettings,
}

impl SignalExtractor {
    pub fn new(catalog: AssetCatalog, venues: VenueCatalog, settings: PipelineSettings) -> Self {
        Self {
            catalog,
            venues,
            settings,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            AssetCatalog::default(),
            VenueCatalog::default(),
            PipelineSettings::default(),
        )
    }

    /// Extract 0..N candidate signals from one message. Empty output is
    /// normal, not an error.
    pub fn extract(&self, raw_text: &str, meta: &MessageMeta) -> Vec<Signal> {
        let cleaned = normalize_text(raw_text);
        if cleaned.trim().is_empty() {
            return Vec::new();
        }

        let source = SourceInfo {
            platform: meta.platform,
            channel: meta.channel.clone(),
            message_id: meta.message_id.clone(),
            raw_text: raw_text.to_string(),
            cleaned_text: cleaned.clone(),
            timestamp: meta.timestamp,
        };

        // Structured and heuristic extraction are mutually exclusive per
        // message: a structured match settles the question of what the
        // message says, even when its ticker fails the whitelist.
        if let Some(fields) = parse_structured(&cleaned) {
            let Some(asset) = self.catalog.resolve(&fields.coin) else {
                debug!(coin = %fields.coin, "structured block ticker not in whitelist, dropped");
                return Vec::new();
            };
            let mut signal = Signal::new(source, asset, fields.direction, ExtractionTier::Structured);
            signal.entry = to_entry(fields.entry);
            signal.targets = fields.targets;
            signal.stop_loss = fields.stop_loss;
            signal.leverage = fields.leverage;
            signal.timeframe = fields.timeframe;
            signal.venue_available = self.venues.is_available(&signal.asset);
            debug!(id = %signal.id, "structured fast path matched");
            return vec![signal];
        }

        let Some(candidate) = run_cascade(&cleaned) else {
            return Vec::new();
        };
        if candidate.confidence < self.settings.min_extraction_confidence {
            debug!(
                confidence = candidate.confidence,
                floor = self.settings.min_extraction_confidence,
                "cascade candidate below confidence floor, discarded"
            );
            return Vec::new();
        }

        let mut best: Vec<Signal> = Vec::new();
        for asset in self.asset_candidates(&cleaned) {
            let signal = self.build_from_cascade(source.clone(), asset, &candidate);
            match best
                .iter_mut()
                .find(|s| s.asset == signal.asset && s.direction == signal.direction)
            {
                Some(existing) if existing.extraction_confidence < signal.extraction_confidence => {
                    *existing = signal;
                }
                Some(_) => {}
                None => best.push(signal),
            }
        }
        best
    }

    /// Ticker spans worth resolving: $-tagged tokens, all-caps tokens, and
    /// full-name aliases. Everything else is prose.
    fn asset_candidates(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for token in text.split(|c: char| !(c.is_alphanumeric() || c == '$' || c == '/')) {
            if token.is_empty() {
                continue;
            }
            let tagged = token.starts_with('$');
            let bare = token.trim_start_matches('$');
            if bare.len() < 2 || !bare.chars().any(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            let upper = bare.to_uppercase();
            if STOPWORDS.contains(upper.as_str()) {
                continue;
            }
            let caps_like = bare
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/');
            let named_alias = self.catalog.aliases.contains_key(&upper);
            if !(tagged || caps_like || named_alias) {
                continue;
            }
            if let Some(ticker) = self.catalog.resolve(bare) {
                if seen.insert(ticker.clone()) {
                    out.push(ticker);
                }
            }
        }
        out
    }

    fn build_from_cascade(
        &self,
        source: SourceInfo,
        asset: String,
        candidate: &CascadeCandidate,
    ) -> Signal {
        let mut signal = Signal::new(source, asset, candidate.direction, candidate.tier);
        signal.extraction_confidence = candidate.confidence;
        signal.entry = to_entry(candidate.entry.clone());
        signal.targets = candidate.targets.clone();
        signal.stop_loss = candidate.stop_loss.clone();
        signal.leverage = candidate.leverage.clone();
        signal.timeframe = candidate.timeframe;
        signal.venue_available = self.venues.is_available(&signal.asset);
        signal
    }
}

fn to_entry(parsed: Option<ParsedPrice>) -> EntryPrice {
    match parsed {
        None => EntryPrice::Market,
        Some(ParsedPrice::Single(p)) => EntryPrice::Price(p),
        Some(ParsedPrice::Range { low, high }) => EntryPrice::Range { low, high },
    }
}
