// Signal data model
// One Signal is one candidate trade idea extracted from a source message.
// Enrichment stages append to their own sub-records; nothing here is removed
// once set, so downstream consumers can audit every decision.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction stated or implied by the source text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
    Buy,
    Sell,
    Hold,
}

impl Direction {
    /// LONG and BUY expect the price to rise
    pub fn is_bullish(&self) -> bool {
        matches!(self, Direction::Long | Direction::Buy)
    }

    /// SHORT and SELL expect the price to fall
    pub fn is_bearish(&self) -> bool {
        matches!(self, Direction::Short | Direction::Sell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Hold => "HOLD",
        }
    }
}

/// Entry specification: explicit price, a low/high zone, or entry at market
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EntryPrice {
    Market,
    Price(Decimal),
    Range { low: Decimal, high: Decimal },
}

impl EntryPrice {
    /// Single price used for downstream scoring: the price itself, or the
    /// midpoint of a range. Market entries have no price.
    pub fn effective_price(&self) -> Option<Decimal> {
        match self {
            EntryPrice::Market => None,
            EntryPrice::Price(p) => Some(*p),
            EntryPrice::Range { low, high } => Some((*low + *high) / Decimal::from(2)),
        }
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, EntryPrice::Market)
    }
}

/// Stop loss as an absolute price or a percentage distance from entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StopLoss {
    Price(Decimal),
    Percent(f64),
}

impl StopLoss {
    /// Resolve to an absolute price. Percent stops are offset from entry in
    /// the losing direction; unresolvable without a priced entry.
    pub fn resolved(&self, entry: &EntryPrice, direction: Direction) -> Option<Decimal> {
        match self {
            StopLoss::Price(p) => Some(*p),
            StopLoss::Percent(pct) => {
                let entry_price = entry.effective_price()?;
                let offset = entry_price * Decimal::from_f64(pct / 100.0)?;
                if direction.is_bearish() {
                    Some(entry_price + offset)
                } else {
                    Some(entry_price - offset)
                }
            }
        }
    }
}

/// Chart timeframe the signal targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    H1,
    H4,
    D1,
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    pub fn parse(s: &str) -> Option<Timeframe> {
        match s.to_lowercase().trim() {
            "1m" | "m1" => Some(Timeframe::M1),
            "5m" | "m5" => Some(Timeframe::M5),
            "15m" | "m15" => Some(Timeframe::M15),
            "1h" | "h1" | "60m" => Some(Timeframe::H1),
            "4h" | "h4" => Some(Timeframe::H4),
            "1d" | "d1" | "daily" => Some(Timeframe::D1),
            "1w" | "w1" | "weekly" => Some(Timeframe::W1),
            _ => None,
        }
    }
}

/// Source platform the message arrived from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    Telegram,
    Reddit,
    TradingView,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Reddit => "reddit",
            Platform::TradingView => "tradingview",
        }
    }

    pub fn parse(s: &str) -> Option<Platform> {
        match s {
            "telegram" => Some(Platform::Telegram),
            "reddit" => Some(Platform::Reddit),
            "tradingview" => Some(Platform::TradingView),
            _ => None,
        }
    }
}

/// Provenance of the message a signal was extracted from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceInfo {
    pub platform: Platform,
    pub channel: String,
    pub message_id: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Which extraction path produced the signal. Drives prior confidence:
/// structured blocks are trusted far more than a bare price mention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExtractionTier {
    /// Labeled-field block parsed by the structured fast path
    Structured,
    /// Full signal with explicit entry and target prices
    FullSignal,
    /// Direction plus a single price
    DirectionPrice,
    /// Technical-analysis phrasing implying a direction
    TechnicalAnalysis,
    /// Bare price-target mention
    PriceTarget,
}

impl ExtractionTier {
    /// Base confidence assigned before entry/target bonuses
    pub fn base_confidence(&self) -> f64 {
        match self {
            ExtractionTier::Structured => 95.0,
            ExtractionTier::FullSignal => 85.0,
            ExtractionTier::DirectionPrice => 65.0,
            ExtractionTier::TechnicalAnalysis => 60.0,
            ExtractionTier::PriceTarget => 45.0,
        }
    }
}

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One validation finding attached to a signal. Findings annotate, they
/// never remove the signal from the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationFinding {
    pub severity: Severity,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationFinding {
    pub fn critical(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            field: field.to_string(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn info(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            field: field.to_string(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Final five-level quality classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QualityTier {
    Excellent,
    Good,
    Basic,
    Poor,
    Unreliable,
}

impl QualityTier {
    /// Step function over the 0-100 overall score: 85/70/50/30
    pub fn from_score(score: f64) -> QualityTier {
        if score >= 85.0 {
            QualityTier::Excellent
        } else if score >= 70.0 {
            QualityTier::Good
        } else if score >= 50.0 {
            QualityTier::Basic
        } else if score >= 30.0 {
            QualityTier::Poor
        } else {
            QualityTier::Unreliable
        }
    }

    /// Numeric rank, higher is better (Unreliable = 0, Excellent = 4)
    pub fn rank(&self) -> u8 {
        match self {
            QualityTier::Excellent => 4,
            QualityTier::Good => 3,
            QualityTier::Basic => 2,
            QualityTier::Poor => 1,
            QualityTier::Unreliable => 0,
        }
    }

    fn from_rank(rank: u8) -> QualityTier {
        match rank {
            4.. => QualityTier::Excellent,
            3 => QualityTier::Good,
            2 => QualityTier::Basic,
            1 => QualityTier::Poor,
            0 => QualityTier::Unreliable,
        }
    }

    /// One step better, saturating at Excellent
    pub fn step_up(&self) -> QualityTier {
        QualityTier::from_rank(self.rank().saturating_add(1))
    }

    /// One step worse, saturating at Unreliable
    pub fn step_down(&self) -> QualityTier {
        QualityTier::from_rank(self.rank().saturating_sub(1))
    }
}

/// Score block filled in by the enrichment stages. All scores are on a
/// 0-100 scale except risk_reward_ratio (a raw ratio) and
/// sentiment/classifier scores which keep their native -1..1 / 0..1 scales.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalScores {
    pub risk_reward_ratio: f64,
    pub technical_score: f64,
    pub confidence_score: f64,
    pub reliability_score: f64,
    pub sentiment_score: f64,
    pub classifier_score: f64,
    pub overall_score: f64,
    pub quality_tier: QualityTier,
}

impl Default for SignalScores {
    fn default() -> Self {
        Self {
            risk_reward_ratio: 0.0,
            technical_score: 0.0,
            confidence_score: 0.0,
            reliability_score: 0.0,
            sentiment_score: 0.0,
            classifier_score: 0.0,
            overall_score: 0.0,
            quality_tier: QualityTier::Unreliable,
        }
    }
}

/// One candidate trade idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub id: String,
    pub asset: String,
    pub direction: Direction,
    pub entry: EntryPrice,
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<StopLoss>,
    pub leverage: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub source: SourceInfo,
    pub extraction_tier: ExtractionTier,
    /// Extractor prior confidence on a 0-100 scale (tier base + bonuses)
    pub extraction_confidence: f64,
    pub validation: Vec<ValidationFinding>,
    pub is_valid: bool,
    pub scores: SignalScores,
    pub venue_available: bool,
}

impl Signal {
    /// Deterministic id so re-running the pipeline over the same message
    /// yields byte-identical output (and outcome lookups stay stable).
    pub fn make_id(source: &SourceInfo, asset: &str, direction: Direction) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            source.platform.as_str(),
            source.channel,
            source.message_id,
            asset,
            direction.as_str()
        )
    }

    pub fn new(
        source: SourceInfo,
        asset: String,
        direction: Direction,
        tier: ExtractionTier,
    ) -> Self {
        let id = Signal::make_id(&source, &asset, direction);
        Self {
            id,
            asset,
            direction,
            entry: EntryPrice::Market,
            targets: Vec::new(),
            stop_loss: None,
            leverage: None,
            timeframe: None,
            source,
            extraction_tier: tier,
            extraction_confidence: tier.base_confidence(),
            validation: Vec::new(),
            is_valid: true,
            scores: SignalScores::default(),
            venue_available: false,
        }
    }

    /// Entry price used for scoring (midpoint for ranges)
    pub fn entry_price(&self) -> Option<Decimal> {
        self.entry.effective_price()
    }

    /// Stop loss resolved to an absolute price
    pub fn stop_price(&self) -> Option<Decimal> {
        self.stop_loss
            .as_ref()
            .and_then(|s| s.resolved(&self.entry, self.direction))
    }

    pub fn has_critical_findings(&self) -> bool {
        self.validation
            .iter()
            .any(|f| f.severity == Severity::Critical)
    }

    /// Dedup key within one batch: same idea from the same channel
    pub fn dedup_key(&self) -> (String, Direction, String) {
        (
            self.asset.clone(),
            self.direction,
            self.source.channel.clone(),
        )
    }
}
