// Adaptive Classifier
// A hand-weighted linear scorer over 18 named features, not a trained
// model. The weight vector is the only long-lived mutable state in the
// pipeline: scoring reads a snapshot, feedback updates are serialized
// behind a write lock and renormalize the vector to sum 1.0.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{ChannelStats, EnrichmentError, ExtractionTier, Platform, Severity, Signal};

/// Score threshold separating valid from invalid signals
const VALID_THRESHOLD: f64 = 0.6;
/// Confidence needed on top of validity before recommending a trade
const TRADE_CONFIDENCE: f64 = 0.7;
/// Multiplicative feedback step applied to active feature weights
const FEEDBACK_STEP: f64 = 0.01;
/// A feature counts as active in a prediction above this value
const ACTIVE_FEATURE: f64 = 0.5;

const TECHNICAL_KEYWORDS: &[&str] = &[
    "rsi", "macd", "ema", "sma", "support", "resistance", "breakout", "breakdown", "divergence",
    "fibonacci", "volume", "trend", "cross", "retest",
];

const DIRECTION_KEYWORDS: &[&str] = &["long", "short", "buy", "sell", "hold"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecommendedAction {
    Trade,
    Monitor,
    Ignore,
}

/// Output of one classifier pass over a signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MlPrediction {
    /// Weighted feature score in [0, 1]
    pub quality_score: f64,
    pub is_valid_signal: bool,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommended_action: RecommendedAction,
    /// Per-feature contribution (weight x value) for explainability
    pub feature_importance: BTreeMap<String, f64>,
}

impl MlPrediction {
    /// Degraded prediction used when feature extraction fails: the signal
    /// is reported, never traded on.
    pub fn rejected() -> Self {
        Self {
            quality_score: 0.0,
            is_valid_signal: false,
            confidence: 0.0,
            risk_level: RiskLevel::High,
            recommended_action: RecommendedAction::Ignore,
            feature_importance: BTreeMap::new(),
        }
    }
}

/// Named weight vector, normalized to sum 1.0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierState {
    weights: BTreeMap<String, f64>,
}

impl ClassifierState {
    fn normalize(&mut self) {
        let sum: f64 = self.weights.values().sum();
        if sum > 0.0 {
            for w in self.weights.values_mut() {
                *w /= sum;
            }
        }
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Multiply the named weights by the feedback factor and renormalize
    fn apply_feedback(&mut self, active: &[String], was_correct: bool) {
        let factor = if was_correct {
            1.0 + FEEDBACK_STEP
        } else {
            1.0 - FEEDBACK_STEP
        };
        for name in active {
            if let Some(w) = self.weights.get_mut(name) {
                *w *= factor;
            }
        }
        self.normalize();
    }
}

impl Default for ClassifierState {
    fn default() -> Self {
        let raw: [(&str, f64); 18] = [
            ("text_length", 0.02),
            ("has_entry", 0.07),
            ("has_target", 0.07),
            ("has_stop", 0.06),
            ("has_leverage", 0.03),
            ("has_timeframe", 0.02),
            ("technical_keywords", 0.05),
            ("price_mentions", 0.04),
            ("direction_keywords", 0.04),
            ("structured_format", 0.08),
            ("emoji_restraint", 0.02),
            ("link_restraint", 0.02),
            ("mention_restraint", 0.02),
            ("price_logic", 0.12),
            ("risk_reward", 0.10),
            ("prior_confidence", 0.15),
            ("source_quality", 0.03),
            ("channel_reputation", 0.06),
        ];
        let mut state = Self {
            weights: raw.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
        };
        state.normalize();
        state
    }
}

/// Shared-handle classifier. Clone freely; all clones score against and
/// train the same weight vector.
#[derive(Clone)]
pub struct AdaptiveClassifier {
    state: Arc<RwLock<ClassifierState>>,
}

impl AdaptiveClassifier {
    pub fn new(state: ClassifierState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ClassifierState::default())
    }

    /// Snapshot of the current weights
    pub fn state_snapshot(&self) -> Result<ClassifierState, EnrichmentError> {
        self.state
            .read()
            .map(|s| s.clone())
            .map_err(|_| EnrichmentError::classifier("-", "classifier state lock poisoned"))
    }

    /// Score one signal. Reads a weight snapshot; never blocks on writers
    /// longer than the copy takes.
    pub fn predict(
        &self,
        signal: &Signal,
        original_text: &str,
        channel_stats: Option<&ChannelStats>,
    ) -> Result<MlPrediction, EnrichmentError> {
        let features = extract_features(signal, original_text, channel_stats);
        for (name, value) in &features {
            if !value.is_finite() {
                return Err(EnrichmentError::classifier(
                    &signal.id,
                    format!("feature '{}' is not finite", name),
                ));
            }
        }

        let state = self
            .state
            .read()
            .map_err(|_| EnrichmentError::classifier(&signal.id, "state lock poisoned"))?;

        let mut score = 0.0;
        let mut importance = BTreeMap::new();
        for (name, value) in &features {
            let weight = state.weights.get(*name).copied().unwrap_or(0.0);
            let clamped = value.clamp(0.0, 1.0);
            score += weight * clamped;
            importance.insert((*name).to_string(), weight * clamped);
        }
        drop(state);

        let is_valid_signal = score >= VALID_THRESHOLD;
        let confidence =
            (score * 0.7 + (signal.extraction_confidence / 100.0).clamp(0.0, 1.0) * 0.3)
                .clamp(0.0, 1.0);
        let risk_level = if score >= 0.8 {
            RiskLevel::Low
        } else if score >= VALID_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
        let recommended_action = if is_valid_signal && confidence >= TRADE_CONFIDENCE {
            RecommendedAction::Trade
        } else if is_valid_signal {
            RecommendedAction::Monitor
        } else {
            RecommendedAction::Ignore
        };

        debug!(id = %signal.id, score, valid = is_valid_signal, "classifier prediction");

        Ok(MlPrediction {
            quality_score: score,
            is_valid_signal,
            confidence,
            risk_level,
            recommended_action,
            feature_importance: importance,
        })
    }

    /// Online feedback: weights of the features active in this signal move
    /// by one multiplicative step, then the vector renormalizes to 1.0.
    /// Writes are serialized behind the lock so concurrent feedback never
    /// loses an update.
    pub fn train_on_feedback(
        &self,
        signal: &Signal,
        was_correct: bool,
        actual_profit_pct: f64,
    ) -> Result<(), EnrichmentError> {
        let features = extract_features(signal, &signal.source.cleaned_text, None);
        let active: Vec<String> = features
            .iter()
            .filter(|(_, v)| *v >= ACTIVE_FEATURE)
            .map(|(n, _)| n.to_string())
            .collect();

        let mut state = self
            .state
            .write()
            .map_err(|_| EnrichmentError::classifier(&signal.id, "state lock poisoned"))?;
        state.apply_feedback(&active, was_correct);
        debug!(
            id = %signal.id,
            was_correct,
            actual_profit_pct,
            active = active.len(),
            "classifier feedback applied"
        );
        Ok(())
    }
}

/// The 18-feature vector, every value normalized into [0, 1]
fn extract_features(
    signal: &Signal,
    original_text: &str,
    channel_stats: Option<&ChannelStats>,
) -> Vec<(&'static str, f64)> {
    let lower = original_text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    let technical_hits = TECHNICAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(**k))
        .count();
    let direction_hits = tokens
        .iter()
        .filter(|t| DIRECTION_KEYWORDS.contains(&t.trim_matches(|c: char| !c.is_alphanumeric())))
        .count();
    let price_mentions = tokens
        .iter()
        .filter(|t| {
            let t = t.trim_start_matches('$');
            t.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .count();

    let emoji_count = original_text
        .chars()
        .filter(|c| {
            let cp = *c as u32;
            (0x1F300..=0x1FAFF).contains(&cp) || (0x2600..=0x27BF).contains(&cp)
        })
        .count();
    let has_link =
        lower.contains("http://") || lower.contains("https://") || lower.contains("t.me/");
    let mention_count = original_text.matches('@').count();

    let price_logic = if signal
        .validation
        .iter()
        .any(|f| f.severity == Severity::Critical && (f.field == "targets" || f.field == "stop_loss"))
    {
        0.3
    } else {
        1.0
    };

    let source_quality = match signal.source.platform {
        Platform::TradingView => 0.8,
        Platform::Telegram => 0.6,
        Platform::Reddit => 0.5,
    };
    let channel_reputation = channel_stats
        .and_then(|s| s.success_rate())
        .unwrap_or(0.5);

    vec![
        ("text_length", (original_text.len() as f64 / 500.0).min(1.0)),
        ("has_entry", bool_feature(signal.entry.is_priced())),
        ("has_target", bool_feature(!signal.targets.is_empty())),
        ("has_stop", bool_feature(signal.stop_loss.is_some())),
        ("has_leverage", bool_feature(signal.leverage.is_some())),
        ("has_timeframe", bool_feature(signal.timeframe.is_some())),
        ("technical_keywords", (technical_hits as f64 / 5.0).min(1.0)),
        ("price_mentions", (price_mentions as f64 / 5.0).min(1.0)),
        ("direction_keywords", (direction_hits as f64 / 3.0).min(1.0)),
        (
            "structured_format",
            bool_feature(signal.extraction_tier == ExtractionTier::Structured),
        ),
        ("emoji_restraint", 1.0 - (emoji_count as f64 / 5.0).min(1.0)),
        ("link_restraint", if has_link { 0.0 } else { 1.0 }),
        (
            "mention_restraint",
            1.0 - (mention_count as f64 / 3.0).min(1.0),
        ),
        ("price_logic", price_logic),
        ("risk_reward", (signal.scores.risk_reward_ratio / 3.0).min(1.0)),
        (
            "prior_confidence",
            (signal.extraction_confidence / 100.0).clamp(0.0, 1.0),
        ),
        ("source_quality", source_quality),
        ("channel_reputation", channel_reputation),
    ]
}

fn bool_feature(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}
