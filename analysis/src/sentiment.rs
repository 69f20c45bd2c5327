// Sentiment Analyzer
// Lexicon-based tone reading of the original message. Produces an
// independent SentimentResult and a bounded adjustment to the signal:
// confidence moves by at most 20% of its prior value and the quality tier
// shifts at most one step per pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::Signal;

use crate::lexicon::SentimentLexicon;

/// Tone label over the whole message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Market stance read from technical phrasing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketSentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EmotionBreakdown {
    pub fear: f64,
    pub greed: f64,
    pub optimism: f64,
    pub pessimism: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentResult {
    pub overall_sentiment: SentimentLabel,
    /// -1.0 (very negative) to 1.0 (very positive)
    pub sentiment_score: f64,
    /// 0.0 to 1.0, grows with lexicon evidence density
    pub confidence: f64,
    pub emotion_breakdown: EmotionBreakdown,
    pub market_sentiment: MarketSentiment,
    pub key_phrases: Vec<String>,
    pub risk_indicators: Vec<String>,
}

pub struct SentimentAnalyzer {
    lexicon: SentimentLexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    pub fn with_defaults() -> Self {
        Self::new(SentimentLexicon::default())
    }

    /// Pure analysis of the original message text. Mutation of the signal
    /// happens separately in apply_adjustment so the aggregator can fix
    /// the order of enrichment effects.
    pub fn analyze(&self, original_text: &str) -> SentimentResult {
        let lower = original_text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .collect();
        let token_count = tokens.len().max(1) as f64;

        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut fear = 0usize;
        let mut greed = 0usize;
        let mut optimism = 0usize;
        let mut pessimism = 0usize;
        let mut key_phrases: Vec<String> = Vec::new();

        for token in &tokens {
            let t = *token;
            if self.lexicon.positive.contains(t) {
                positive += 1;
                push_unique(&mut key_phrases, t);
            }
            if self.lexicon.negative.contains(t) {
                negative += 1;
                push_unique(&mut key_phrases, t);
            }
            if self.lexicon.fear.contains(t) {
                fear += 1;
            }
            if self.lexicon.greed.contains(t) {
                greed += 1;
            }
            if self.lexicon.optimism.contains(t) {
                optimism += 1;
            }
            if self.lexicon.pessimism.contains(t) {
                pessimism += 1;
            }
        }

        let bullish_hits = self
            .lexicon
            .bullish_phrases
            .iter()
            .filter(|p| lower.contains(p.as_str()))
            .count();
        let bearish_hits = self
            .lexicon
            .bearish_phrases
            .iter()
            .filter(|p| lower.contains(p.as_str()))
            .count();
        for phrase in self
            .lexicon
            .bullish_phrases
            .iter()
            .chain(self.lexicon.bearish_phrases.iter())
        {
            if lower.contains(phrase.as_str()) {
                push_unique(&mut key_phrases, phrase);
            }
        }

        let risk_indicators: Vec<String> = self
            .lexicon
            .risk_phrases
            .iter()
            .filter(|p| lower.contains(p.as_str()))
            .cloned()
            .collect();

        let raw = (positive as f64 - negative as f64) / token_count;
        let sentiment_score = (raw * 5.0).clamp(-1.0, 1.0);
        let overall_sentiment = if sentiment_score > 0.1 {
            SentimentLabel::Positive
        } else if sentiment_score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        let market_sentiment = if bullish_hits > bearish_hits {
            MarketSentiment::Bullish
        } else if bearish_hits > bullish_hits {
            MarketSentiment::Bearish
        } else {
            MarketSentiment::Neutral
        };

        let evidence = positive + negative + fear + greed + optimism + pessimism
            + bullish_hits
            + bearish_hits;
        let confidence = ((evidence as f64 / token_count) * 4.0).clamp(0.0, 1.0);

        key_phrases.truncate(8);

        SentimentResult {
            overall_sentiment,
            sentiment_score,
            confidence,
            emotion_breakdown: EmotionBreakdown {
                fear: (fear as f64 / token_count * 5.0).clamp(0.0, 1.0),
                greed: (greed as f64 / token_count * 5.0).clamp(0.0, 1.0),
                optimism: (optimism as f64 / token_count * 5.0).clamp(0.0, 1.0),
                pessimism: (pessimism as f64 / token_count * 5.0).clamp(0.0, 1.0),
            },
            market_sentiment,
            key_phrases,
            risk_indicators,
        }
    }

    /// Bounded side effect on the signal: confidence moves by at most
    /// +/-20% of its prior value, quality tier by at most one step.
    pub fn apply_adjustment(&self, signal: &mut Signal, result: &SentimentResult) {
        signal.scores.sentiment_score = result.sentiment_score;

        // agreement: positive tone helps longs, negative tone helps shorts
        let alignment = if signal.direction.is_bearish() {
            -result.sentiment_score
        } else {
            result.sentiment_score
        };
        let strength = alignment * result.confidence;

        let prior = signal.scores.confidence_score;
        let adjusted = prior * (1.0 + 0.2 * strength.clamp(-1.0, 1.0));
        signal.scores.confidence_score = adjusted.clamp(0.0, 100.0);

        if !result.risk_indicators.is_empty() || strength <= -0.5 {
            signal.scores.quality_tier = signal.scores.quality_tier.step_down();
            debug!(id = %signal.id, "sentiment stepped quality tier down");
        } else if strength >= 0.5 {
            signal.scores.quality_tier = signal.scores.quality_tier.step_up();
            debug!(id = %signal.id, "sentiment stepped quality tier up");
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}
