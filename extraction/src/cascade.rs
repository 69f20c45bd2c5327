// Heuristic extraction cascade
// Priority-ordered pattern families for free-form messages, tried only
// when the structured fast path found nothing. First family to match wins
// and fixes the extraction tier; entry/target presence adds confidence on
// top of the tier base.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use common::{Direction, ExtractionTier, StopLoss, Timeframe};

use crate::price::{parse_price, parse_price_list, parse_price_or_range, ParsedPrice};
use crate::structured::parse_direction_word;

lazy_static! {
    static ref DIRECTION_VERB: Regex =
        Regex::new(r"(?i)\b(LONG|SHORT|BUY|SELL|HOLD|ЛОНГ|ШОРТ|ПОКУПКА|ПРОДАЖА)\b").unwrap();
    static ref ENTRY_LABELED: Regex = Regex::new(
        r"(?i)\b(?:ENTRY|ENTER(?:ING)?|BUY\s*ZONE|ВХОД)\s*(?:at|@|:|=)?\s*(\$?[\d.,]+[kKmM]?(?:\s*[-–]\s*\$?[\d.,]+[kKmM]?)?)"
    )
    .unwrap();
    static ref TARGET_LABELED: Regex = Regex::new(
        r"(?i)\b(?:TARGETS?|TAKE\s*PROFITS?|TP\d?|ЦЕЛИ|ЦЕЛЬ)\s*(?:at|@|:|=)?\s*((?:\$?[\d.,]+[kKmM]?[\s,/–-]*)+)"
    )
    .unwrap();
    static ref STOP_LABELED: Regex = Regex::new(
        r"(?i)\b(?:STOP\s*LOSS|STOP|SL|СТОП(?:\s*ЛОСС)?)\s*(?:at|@|:|=)?\s*(\$?[\d.,]+[kKmM]?\s*%?)"
    )
    .unwrap();
    static ref LEVERAGE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:LEVERAGE|LEV|ПЛЕЧО)\s*[:=]?\s*(\d+(?:\s*[-–]\s*\d+)?)\s*[x×]?"
    )
    .unwrap();
    static ref LEVERAGE_BARE: Regex =
        Regex::new(r"(?i)\b(\d+(?:\s*[-–]\s*\d+)?\s*[x×])(?:\b|\s|$)").unwrap();
    static ref TIMEFRAME_BARE: Regex =
        Regex::new(r"(?i)\b(1m|5m|15m|1h|4h|1d|1w)\b").unwrap();
    static ref BARE_PRICE: Regex = Regex::new(r"\$?\b\d[\d.,]*[kKmM]?\b").unwrap();
    static ref MOVE_TO_PRICE: Regex = Regex::new(
        r"(?i)\b(?:to|towards|target\s+of|heading\s+(?:to|for)|price\s+target\s*:?\s*)\s*\$?(\d[\d.,]*[kKmM]?)\b"
    )
    .unwrap();
}

/// Technical phrasing that implies a long without any trade verb
const BULLISH_PHRASES: &[&str] = &[
    "breakout",
    "breaking out",
    "bullish",
    "oversold",
    "golden cross",
    "higher lows",
    "support holding",
    "support held",
    "accumulation zone",
    "double bottom",
    "inverse head and shoulders",
    "bounce incoming",
    "reversal up",
];

/// Technical phrasing that implies a short
const BEARISH_PHRASES: &[&str] = &[
    "breakdown",
    "breaking down",
    "bearish",
    "overbought",
    "death cross",
    "lower highs",
    "resistance rejected",
    "rejected at resistance",
    "distribution zone",
    "double top",
    "head and shoulders",
    "losing support",
];

/// Trade fields recovered by one cascade pass over a message.
/// Asset attribution happens in the extractor; the cascade only decides
/// whether the text reads like a trade and at which tier.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeCandidate {
    pub tier: ExtractionTier,
    pub confidence: f64,
    pub direction: Direction,
    pub entry: Option<ParsedPrice>,
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<StopLoss>,
    pub leverage: Option<String>,
    pub timeframe: Option<Timeframe>,
}

/// Run the family cascade over normalized text. Families are tried in
/// priority order and the first match fixes the tier.
pub fn run_cascade(text: &str) -> Option<CascadeCandidate> {
    let lower = text.to_lowercase();

    let direction_verb = DIRECTION_VERB
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_direction_word(m.as_str()));

    let entry = ENTRY_LABELED
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price_or_range(m.as_str()));

    let targets = TARGET_LABELED
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| parse_price_list(m.as_str()))
        .unwrap_or_default();

    let stop_loss = STOP_LABELED
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| {
            let raw = m.as_str().trim();
            if let Some(pct) = raw.strip_suffix('%') {
                pct.trim().parse::<f64>().ok().map(StopLoss::Percent)
            } else {
                parse_price(raw).map(StopLoss::Price)
            }
        });

    let leverage = LEVERAGE_LABELED
        .captures(text)
        .or_else(|| LEVERAGE_BARE.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| {
            let compact: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            let compact = compact.to_lowercase();
            if compact.ends_with('x') {
                compact
            } else {
                format!("{}x", compact)
            }
        });

    let timeframe = TIMEFRAME_BARE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| Timeframe::parse(m.as_str()));

    let has_bare_price = BARE_PRICE.is_match(text);
    let bullish_hits = BULLISH_PHRASES.iter().filter(|p| lower.contains(**p)).count();
    let bearish_hits = BEARISH_PHRASES.iter().filter(|p| lower.contains(**p)).count();

    let mentioned_target = MOVE_TO_PRICE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(m.as_str()));

    let (tier, direction) = match direction_verb {
        // Family 1: full signal, explicit direction plus labeled entry and target
        Some(dir) if entry.is_some() && !targets.is_empty() => (ExtractionTier::FullSignal, dir),
        // Family 2: direction plus at least one price
        Some(dir) if entry.is_some() || has_bare_price => (ExtractionTier::DirectionPrice, dir),
        // Family 3: technical-analysis phrasing implying a direction
        _ if bullish_hits != bearish_hits => {
            let implied = if bullish_hits > bearish_hits {
                Direction::Long
            } else {
                Direction::Short
            };
            (ExtractionTier::TechnicalAnalysis, implied)
        }
        // Family 4: bare price-target mention
        _ if !targets.is_empty() || mentioned_target.is_some() => {
            (ExtractionTier::PriceTarget, Direction::Buy)
        }
        _ => return None,
    };

    let mut targets = targets;
    if targets.is_empty() {
        if let Some(t) = mentioned_target {
            // only treat "to X" as a target when nothing labeled exists
            if tier == ExtractionTier::PriceTarget {
                targets.push(t);
            }
        }
    }

    let mut confidence = tier.base_confidence();
    if entry.is_some() {
        confidence += 15.0;
    }
    if !targets.is_empty() {
        confidence += 10.0;
    }
    let confidence = confidence.min(100.0);

    Some(CascadeCandidate {
        tier,
        confidence,
        direction,
        entry,
        targets,
        stop_loss,
        leverage,
        timeframe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_family_full_signal() {
        let c = run_cascade("BTC LONG Entry: 50000 Target: 55000 Stop: 48000 Leverage: 10x")
            .expect("match");
        assert_eq!(c.tier, ExtractionTier::FullSignal);
        assert_eq!(c.direction, Direction::Long);
        assert_eq!(c.entry, Some(ParsedPrice::Single(dec!(50000))));
        assert_eq!(c.targets, vec![dec!(55000)]);
        assert_eq!(c.stop_loss, Some(StopLoss::Price(dec!(48000))));
        assert_eq!(c.leverage.as_deref(), Some("10x"));
        // 85 base + 15 entry + 10 target, clamped
        assert_eq!(c.confidence, 100.0);
    }

    #[test]
    fn test_family_direction_price() {
        let c = run_cascade("ETH SHORT 3000").expect("match");
        assert_eq!(c.tier, ExtractionTier::DirectionPrice);
        assert_eq!(c.direction, Direction::Short);
        assert_eq!(c.confidence, 65.0);
    }

    #[test]
    fn test_family_technical_analysis() {
        let c = run_cascade("BTC looking bullish, golden cross on the 4h").expect("match");
        assert_eq!(c.tier, ExtractionTier::TechnicalAnalysis);
        assert_eq!(c.direction, Direction::Long);
        assert_eq!(c.timeframe, Some(Timeframe::H4));
        assert_eq!(c.confidence, 60.0);

        let c = run_cascade("ETH rejected at resistance, death cross forming").expect("match");
        assert_eq!(c.direction, Direction::Short);
    }

    #[test]
    fn test_family_price_target() {
        let c = run_cascade("BTC heading to 100k imo").expect("match");
        assert_eq!(c.tier, ExtractionTier::PriceTarget);
        assert_eq!(c.targets, vec![dec!(100000)]);
        // 45 base + 10 target
        assert_eq!(c.confidence, 55.0);
    }

    #[test]
    fn test_no_match() {
        assert!(run_cascade("gm everyone, great weather today").is_none());
        assert!(run_cascade("").is_none());
    }

    #[test]
    fn test_entry_bonus_without_target() {
        let c = run_cascade("SOL LONG entry at 150").expect("match");
        assert_eq!(c.tier, ExtractionTier::DirectionPrice);
        assert_eq!(c.confidence, 80.0);
        assert_eq!(c.entry, Some(ParsedPrice::Single(dec!(150))));
    }
}
