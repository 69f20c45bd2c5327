// Quality Scorer / Risk-Reward Analyzer
// Produces the baseline composite score: direction-aware risk/reward,
// technical completeness, extraction confidence after validation
// penalties, and provenance reliability. Every number in the report maps
// to a recommendation string so no score is ever unexplained.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{EnrichmentError, QualityTier, Severity, Signal};

/// Composite weights over the four sub-scores
const W_RISK_REWARD: f64 = 0.35;
const W_TECHNICAL: f64 = 0.25;
const W_CONFIDENCE: f64 = 0.25;
const W_RELIABILITY: f64 = 0.15;

/// Risk bucket as a percentage distance from entry to stop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskBucket {
    Low,      // <= 2%
    Medium,   // <= 5%
    High,     // <= 10%
    VeryHigh, // > 10%
}

impl RiskBucket {
    fn from_pct(pct: f64) -> Self {
        if pct <= 2.0 {
            RiskBucket::Low
        } else if pct <= 5.0 {
            RiskBucket::Medium
        } else if pct <= 10.0 {
            RiskBucket::High
        } else {
            RiskBucket::VeryHigh
        }
    }
}

/// Reward bucket as a percentage distance from entry to first target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RewardBucket {
    Low,       // < 2%
    Moderate,  // < 5%
    Good,      // < 10%
    Excellent, // >= 10%
}

impl RewardBucket {
    fn from_pct(pct: f64) -> Self {
        if pct < 2.0 {
            RewardBucket::Low
        } else if pct < 5.0 {
            RewardBucket::Moderate
        } else if pct < 10.0 {
            RewardBucket::Good
        } else {
            RewardBucket::Excellent
        }
    }
}

/// Full scoring report for one signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub risk_reward_ratio: f64,
    pub risk_bucket: Option<RiskBucket>,
    pub reward_bucket: Option<RewardBucket>,
    pub technical_score: f64,
    pub confidence_score: f64,
    pub reliability_score: f64,
    pub overall_score: f64,
    pub quality_tier: QualityTier,
    pub recommendations: Vec<String>,
}

pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one signal and write the results into its score block.
    /// Fails only when prices cannot be represented as floats; the caller
    /// degrades that signal to neutral scores and keeps the batch going.
    pub fn score(&self, signal: &mut Signal) -> Result<QualityReport, EnrichmentError> {
        let (risk_reward_ratio, risk_bucket, reward_bucket) = self.risk_reward(signal)?;
        let technical_score = self.technical(signal);
        let confidence_score = self.confidence(signal);
        let reliability_score = self.reliability(signal);

        let rr_score = (risk_reward_ratio / 3.0 * 100.0).clamp(0.0, 100.0);
        let overall_score = if risk_reward_ratio > 0.0 {
            W_RISK_REWARD * rr_score
                + W_TECHNICAL * technical_score
                + W_CONFIDENCE * confidence_score
                + W_RELIABILITY * reliability_score
        } else {
            // no defined risk/reward: redistribute its weight so signals
            // stay comparable instead of all sinking by a flat 35 points
            (W_TECHNICAL * technical_score
                + W_CONFIDENCE * confidence_score
                + W_RELIABILITY * reliability_score)
                / (W_TECHNICAL + W_CONFIDENCE + W_RELIABILITY)
        }
        .clamp(0.0, 100.0);

        let quality_tier = QualityTier::from_score(overall_score);
        let recommendations = self.recommendations(
            signal,
            risk_reward_ratio,
            risk_bucket,
            technical_score,
            confidence_score,
            reliability_score,
        );

        signal.scores.risk_reward_ratio = risk_reward_ratio;
        signal.scores.technical_score = technical_score;
        signal.scores.confidence_score = confidence_score;
        signal.scores.reliability_score = reliability_score;
        signal.scores.overall_score = overall_score;
        signal.scores.quality_tier = quality_tier;

        debug!(id = %signal.id, overall = overall_score, tier = ?quality_tier, "scored signal");

        Ok(QualityReport {
            risk_reward_ratio,
            risk_bucket,
            reward_bucket,
            technical_score,
            confidence_score,
            reliability_score,
            overall_score,
            quality_tier,
            recommendations,
        })
    }

    /// Ratio of profit distance to loss distance, direction-aware.
    /// Defined only when entry, first target and stop are all present and
    /// on sane sides; otherwise 0.
    fn risk_reward(
        &self,
        signal: &Signal,
    ) -> Result<(f64, Option<RiskBucket>, Option<RewardBucket>), EnrichmentError> {
        let (Some(entry), Some(target), Some(stop)) = (
            signal.entry_price(),
            signal.targets.first().copied(),
            signal.stop_price(),
        ) else {
            return Ok((0.0, None, None));
        };

        let to_f64 = |d: Decimal, field: &str| {
            d.to_f64().ok_or_else(|| {
                EnrichmentError::scoring("quality", &signal.id, format!("{} not representable", field))
            })
        };
        let entry = to_f64(entry, "entry")?;
        let target = to_f64(target, "target")?;
        let stop = to_f64(stop, "stop_loss")?;
        if entry <= 0.0 {
            return Ok((0.0, None, None));
        }

        let (profit, loss) = if signal.direction.is_bearish() {
            (entry - target, stop - entry)
        } else {
            (target - entry, entry - stop)
        };
        if profit <= 0.0 || loss <= 0.0 {
            // wrong-side prices already carry a CRITICAL finding
            return Ok((0.0, None, None));
        }

        let ratio = profit / loss;
        let risk_pct = loss / entry * 100.0;
        let reward_pct = profit / entry * 100.0;
        Ok((
            ratio,
            Some(RiskBucket::from_pct(risk_pct)),
            Some(RewardBucket::from_pct(reward_pct)),
        ))
    }

    /// Additive completeness score against a 50-point baseline
    fn technical(&self, signal: &Signal) -> f64 {
        let mut score: f64 = 50.0;
        score += match signal.extraction_tier {
            common::ExtractionTier::Structured => 20.0,
            common::ExtractionTier::FullSignal => 15.0,
            common::ExtractionTier::DirectionPrice => 8.0,
            common::ExtractionTier::TechnicalAnalysis => 5.0,
            common::ExtractionTier::PriceTarget => 0.0,
        };
        if signal.is_valid {
            score += 10.0;
        }
        if signal.venue_available {
            score += 5.0;
        }
        if signal.entry.is_priced() {
            score += 5.0;
        }
        if !signal.targets.is_empty() {
            score += 5.0;
        }
        if signal.stop_loss.is_some() {
            score += 5.0;
        }
        score.clamp(0.0, 100.0)
    }

    /// Extractor confidence penalized per validation finding
    fn confidence(&self, signal: &Signal) -> f64 {
        let mut score = signal.extraction_confidence;
        for finding in &signal.validation {
            score -= match finding.severity {
                Severity::Critical => 10.0,
                Severity::Warning => 5.0,
                Severity::Info => 0.0,
            };
        }
        score.clamp(0.0, 100.0)
    }

    /// Provenance completeness: raw text, cleaned text, timestamp, id
    fn reliability(&self, signal: &Signal) -> f64 {
        let mut score = 0.0;
        if !signal.source.raw_text.trim().is_empty() {
            score += 25.0;
        }
        if !signal.source.cleaned_text.trim().is_empty() {
            score += 25.0;
        }
        if signal.source.timestamp.timestamp() > 0 {
            score += 25.0;
        }
        if !signal.id.is_empty() && signal.id.contains(':') {
            score += 25.0;
        }
        score
    }

    fn recommendations(
        &self,
        signal: &Signal,
        ratio: f64,
        risk_bucket: Option<RiskBucket>,
        technical: f64,
        confidence: f64,
        reliability: f64,
    ) -> Vec<String> {
        let mut recs = Vec::new();
        if ratio == 0.0 {
            recs.push(
                "risk/reward undefined: needs entry, target and stop loss together".to_string(),
            );
        } else if ratio < 1.0 {
            recs.push(format!(
                "risk outweighs reward ({:.2}): tighten the stop or pick a further target",
                ratio
            ));
        }
        if risk_bucket == Some(RiskBucket::VeryHigh) {
            recs.push("stop loss is more than 10% from entry".to_string());
        }
        if technical < 60.0 {
            recs.push("trade fields are incomplete; treat as an idea, not a setup".to_string());
        }
        if confidence < 50.0 {
            recs.push("low extraction confidence; verify against the source message".to_string());
        }
        if reliability < 75.0 {
            recs.push("provenance is incomplete".to_string());
        }
        if !signal.is_valid {
            recs.push("signal failed validation; review the attached findings".to_string());
        }
        recs
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Direction, EntryPrice, ExtractionTier, Platform, SourceInfo, StopLoss};
    use rust_decimal_macros::dec;

    fn make_signal() -> Signal {
        let source = SourceInfo {
            platform: Platform::Telegram,
            channel: "alpha_calls".to_string(),
            message_id: "1".to_string(),
            raw_text: "BTC LONG Entry: 50000 Target: 55000 Stop: 48000".to_string(),
            cleaned_text: "BTC LONG Entry: 50000 Target: 55000 Stop: 48000".to_string(),
            timestamp: Utc::now(),
        };
        let mut signal = Signal::new(
            source,
            "BTC".to_string(),
            Direction::Long,
            ExtractionTier::FullSignal,
        );
        signal.entry = EntryPrice::Price(dec!(50000));
        signal.targets = vec![dec!(55000)];
        signal.stop_loss = Some(StopLoss::Price(dec!(48000)));
        signal.venue_available = true;
        signal
    }

    #[test]
    fn test_risk_reward_long() {
        let mut signal = make_signal();
        let report = QualityScorer::new().score(&mut signal).unwrap();
        // (55000 - 50000) / (50000 - 48000)
        assert!((report.risk_reward_ratio - 2.5).abs() < 1e-9);
        assert_eq!(report.risk_bucket, Some(RiskBucket::Medium));
        assert_eq!(report.reward_bucket, Some(RewardBucket::Excellent));
    }

    #[test]
    fn test_risk_reward_short() {
        let mut signal = make_signal();
        signal.direction = Direction::Short;
        signal.entry = EntryPrice::Price(dec!(3000));
        signal.targets = vec![dec!(2700)];
        signal.stop_loss = Some(StopLoss::Price(dec!(3100)));
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert!((report.risk_reward_ratio - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_risk_reward_is_zero() {
        let mut signal = make_signal();
        signal.stop_loss = None;
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert_eq!(report.risk_reward_ratio, 0.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("undefined")));
        // weight redistribution keeps the score meaningful
        assert!(report.overall_score > 50.0);
    }

    #[test]
    fn test_wrong_side_prices_yield_zero_ratio() {
        let mut signal = make_signal();
        signal.targets = vec![dec!(45000)]; // below entry on a long
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert_eq!(report.risk_reward_ratio, 0.0);
    }

    #[test]
    fn test_overall_score_in_range_and_tier_consistent() {
        let mut signal = make_signal();
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert!(report.overall_score >= 0.0 && report.overall_score <= 100.0);
        assert_eq!(
            report.quality_tier,
            QualityTier::from_score(report.overall_score)
        );
        assert_eq!(signal.scores.overall_score, report.overall_score);
        assert_eq!(signal.scores.quality_tier, report.quality_tier);
    }

    #[test]
    fn test_confidence_penalized_by_findings() {
        let mut signal = make_signal();
        signal.extraction_confidence = 80.0;
        signal
            .validation
            .push(common::ValidationFinding::critical("targets", "bad"));
        signal
            .validation
            .push(common::ValidationFinding::warning("entry", "odd"));
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert!((report.confidence_score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_stop_feeds_ratio() {
        let mut signal = make_signal();
        // 4% below 50000 = 48000
        signal.stop_loss = Some(StopLoss::Percent(4.0));
        let report = QualityScorer::new().score(&mut signal).unwrap();
        assert!((report.risk_reward_ratio - 2.5).abs() < 1e-9);
    }
}
