// Sentiment lexicons
// Word and phrase sets driving the sentiment analyzer. Injected as
// configuration so an out-of-scope loader can tune them per language or
// community; the defaults cover crypto chat as it is actually written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn word_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentLexicon {
    pub positive: BTreeSet<String>,
    pub negative: BTreeSet<String>,
    pub fear: BTreeSet<String>,
    pub greed: BTreeSet<String>,
    pub optimism: BTreeSet<String>,
    pub pessimism: BTreeSet<String>,
    /// Multi-word technical phrases read as bullish
    pub bullish_phrases: Vec<String>,
    /// Multi-word technical phrases read as bearish
    pub bearish_phrases: Vec<String>,
    /// Manipulation phrasing that flags a signal as risky regardless of tone
    pub risk_phrases: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self {
            positive: word_set(&[
                "gain", "gains", "profit", "profits", "win", "winning", "growth", "strong",
                "breakout", "rally", "surge", "recovery", "support", "accumulate", "undervalued",
                "bullish", "good", "great", "solid", "confident", "up", "upside",
            ]),
            negative: word_set(&[
                "loss", "losses", "crash", "dump", "drop", "fall", "decline", "weak", "breakdown",
                "rekt", "liquidated", "bearish", "bad", "scam", "rug", "risky", "down", "downside",
                "correction", "capitulation",
            ]),
            fear: word_set(&[
                "fear", "panic", "scared", "worried", "nervous", "anxiety", "crash", "collapse",
                "liquidation", "margin", "rekt", "danger", "warning",
            ]),
            greed: word_set(&[
                "moon", "mooning", "lambo", "rich", "millionaire", "ape", "fomo", "yolo",
                "leverage", "degen", "pump", "parabolic",
            ]),
            optimism: word_set(&[
                "bullish", "breakout", "rally", "recovery", "accumulate", "opportunity",
                "undervalued", "confident", "conviction", "strength", "momentum",
            ]),
            pessimism: word_set(&[
                "bearish", "breakdown", "correction", "capitulation", "overvalued", "exit",
                "distribution", "weakness", "doubt", "hopeless",
            ]),
            bullish_phrases: vec![
                "rsi oversold".to_string(),
                "golden cross".to_string(),
                "higher lows".to_string(),
                "double bottom".to_string(),
                "support holding".to_string(),
                "bullish divergence".to_string(),
                "breaking resistance".to_string(),
                "accumulation zone".to_string(),
            ],
            bearish_phrases: vec![
                "rsi overbought".to_string(),
                "death cross".to_string(),
                "lower highs".to_string(),
                "double top".to_string(),
                "losing support".to_string(),
                "bearish divergence".to_string(),
                "breaking support".to_string(),
                "distribution zone".to_string(),
            ],
            risk_phrases: vec![
                "guaranteed profit".to_string(),
                "guaranteed gains".to_string(),
                "cant lose".to_string(),
                "can't lose".to_string(),
                "risk free".to_string(),
                "pump and dump".to_string(),
                "insider info".to_string(),
                "100x guaranteed".to_string(),
                "too good to be true".to_string(),
                "send it all".to_string(),
            ],
        }
    }
}
