// Structured fast path
// One grammar for labeled-field signal blocks ("SIGNAL ID / COIN / ENTRY /
// TARGETS / STOP LOSS / LEVERAGE", with mixed English/Russian labels).
// A match here bypasses the heuristic cascade entirely so one message can
// never produce both a structured and a heuristic candidate.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use common::{Direction, StopLoss, Timeframe};

use crate::price::{parse_price, parse_price_list, parse_price_or_range, ParsedPrice};

lazy_static! {
    static ref SIGNAL_ID: Regex =
        Regex::new(r"(?i)\bSIGNAL\s*(?:ID\s*)?[:#]+\s*#?([A-Za-z0-9_-]+)").unwrap();
    // MOHETA is МОНЕТА after homoglyph demangling
    static ref COIN: Regex = Regex::new(
        r"(?i)\b(?:COIN|PAIR|TICKER|МОНЕТА|MOHETA|ПАРА)\s*[:=\-]?\s*\$?([A-Za-z0-9]{2,10}(?:/[A-Za-z]{2,6})?)"
    )
    .unwrap();
    static ref DIRECTION_LABELED: Regex = Regex::new(
        r"(?i)\b(?:DIRECTION|SIDE|POSITION|НАПРАВЛЕНИЕ)\s*[:=\-]?\s*(LONG|SHORT|BUY|SELL|ЛОНГ|ШОРТ)\b"
    )
    .unwrap();
    static ref DIRECTION_BARE: Regex =
        Regex::new(r"(?i)\b(LONG|SHORT|ЛОНГ|ШОРТ)\b").unwrap();
    static ref ENTRY: Regex = Regex::new(
        r"(?i)\b(?:ENTRY|ENTRIES|ВХОД)(?:\s*(?:ZONE|PRICE|ЗОНА))?\s*[:=\-]?\s*(\$?[\d.,]+[kKmM]?(?:\s*[-–]\s*\$?[\d.,]+[kKmM]?)?)"
    )
    .unwrap();
    static ref TARGETS: Regex = Regex::new(
        r"(?i)\b(?:TARGETS?|TAKE\s*PROFITS?|ЦЕЛИ|ЦЕЛЬ)\s*[:=\-]?\s*((?:\$?[\d.,]+[kKmM]?[\s,/–-]*)+)"
    )
    .unwrap();
    static ref TP_NUMBERED: Regex =
        Regex::new(r"(?i)\bTP\s*\d\s*[:=\-]?\s*(\$?[\d.,]+[kKmM]?)").unwrap();
    static ref STOP: Regex = Regex::new(
        r"(?i)\b(?:STOP\s*LOSS|STOP|SL|СТОП(?:\s*ЛОСС)?)\s*[:=\-]?\s*(\$?[\d.,]+[kKmM]?\s*%?)"
    )
    .unwrap();
    static ref LEVERAGE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:LEVERAGE|LEV|ПЛЕЧО)\s*[:=\-]?\s*[x×]?\s*(\d+(?:\s*[-–]\s*\d+)?)\s*[x×]?"
    )
    .unwrap();
    static ref LEVERAGE_PAREN: Regex =
        Regex::new(r"\((\d+(?:\s*[-–]\s*\d+)?\s*[x×])\)").unwrap();
    static ref TIMEFRAME_LABELED: Regex = Regex::new(
        r"(?i)\b(?:TIMEFRAME|TF|ТАЙМФРЕЙМ)\s*[:=\-]?\s*(\d+[mhdw])\b"
    )
    .unwrap();
}

/// Fields lifted from a labeled signal block, before ticker resolution
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredFields {
    pub signal_id: Option<String>,
    pub coin: String,
    pub direction: Direction,
    pub entry: Option<ParsedPrice>,
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<StopLoss>,
    pub leverage: Option<String>,
    pub timeframe: Option<Timeframe>,
}

/// Try the structured grammar against a normalized message. Requires a
/// labeled coin plus at least two other labeled fields; anything weaker is
/// left to the cascade.
pub fn parse_structured(text: &str) -> Option<StructuredFields> {
    let coin = COIN.captures(text)?.get(1)?.as_str().to_string();

    let signal_id = SIGNAL_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let entry = ENTRY
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price_or_range(m.as_str()));

    let mut targets = TARGETS
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| parse_price_list(m.as_str()))
        .unwrap_or_default();
    for cap in TP_NUMBERED.captures_iter(text) {
        if let Some(price) = cap.get(1).and_then(|m| parse_price(m.as_str())) {
            if !targets.contains(&price) {
                targets.push(price);
            }
        }
    }

    let stop_loss = STOP.captures(text).and_then(|c| c.get(1)).and_then(|m| {
        let raw = m.as_str().trim();
        if let Some(pct) = raw.strip_suffix('%') {
            pct.trim().parse::<f64>().ok().map(StopLoss::Percent)
        } else {
            parse_price(raw).map(StopLoss::Price)
        }
    });

    let leverage = LEVERAGE_PAREN
        .captures(text)
        .or_else(|| LEVERAGE_LABELED.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| {
            let compact: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            if compact.to_lowercase().ends_with('x') {
                compact.to_lowercase()
            } else {
                format!("{}x", compact)
            }
        });

    let timeframe = TIMEFRAME_LABELED
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| Timeframe::parse(m.as_str()));

    let explicit_direction = DIRECTION_LABELED
        .captures(text)
        .and_then(|c| c.get(1))
        .or_else(|| DIRECTION_BARE.captures(text).and_then(|c| c.get(1)))
        .and_then(|m| parse_direction_word(m.as_str()));

    // block strength check: the coin label alone is not a signal
    let labeled_fields = [
        signal_id.is_some(),
        entry.is_some(),
        !targets.is_empty(),
        stop_loss.is_some(),
        leverage.is_some(),
        explicit_direction.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    if labeled_fields < 2 {
        return None;
    }

    let direction = explicit_direction.unwrap_or_else(|| {
        infer_from_prices(entry.as_ref(), targets.first().copied())
    });

    Some(StructuredFields {
        signal_id,
        coin,
        direction,
        entry,
        targets,
        stop_loss,
        leverage,
        timeframe,
    })
}

pub(crate) fn parse_direction_word(word: &str) -> Option<Direction> {
    match word.to_uppercase().as_str() {
        "LONG" | "ЛОНГ" => Some(Direction::Long),
        "SHORT" | "ШОРТ" => Some(Direction::Short),
        "BUY" | "ПОКУПКА" => Some(Direction::Buy),
        "SELL" | "ПРОДАЖА" => Some(Direction::Sell),
        "HOLD" => Some(Direction::Hold),
        _ => None,
    }
}

/// No explicit direction word: a first target above entry reads long,
/// below reads short. With nothing to compare, assume long.
fn infer_from_prices(entry: Option<&ParsedPrice>, first_target: Option<Decimal>) -> Direction {
    let entry_price = entry.and_then(|e| match e {
        ParsedPrice::Single(p) => Some(*p),
        ParsedPrice::Range { low, high } => Some((*low + *high) / Decimal::from(2)),
    });
    match (entry_price, first_target) {
        (Some(e), Some(t)) if t < e => Direction::Short,
        _ => Direction::Long,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_labeled_block() {
        let text = "SIGNAL ID: #1956 COIN: $BTC/USDT (3-5x) Direction: LONG \
                    ENTRY: 112207-110500 TARGETS: 113500-114800-117000 STOP LOSS: 109638";
        let fields = parse_structured(text).expect("structured match");
        assert_eq!(fields.signal_id.as_deref(), Some("1956"));
        assert_eq!(fields.coin, "BTC/USDT");
        assert_eq!(fields.direction, Direction::Long);
        assert_eq!(
            fields.entry,
            Some(ParsedPrice::Range {
                low: dec!(110500),
                high: dec!(112207),
            })
        );
        assert_eq!(
            fields.targets,
            vec![dec!(113500), dec!(114800), dec!(117000)]
        );
        assert_eq!(fields.stop_loss, Some(StopLoss::Price(dec!(109638))));
        assert_eq!(fields.leverage.as_deref(), Some("3-5x"));
    }

    #[test]
    fn test_russian_labels() {
        let text = "МОНЕТА: ETH ВХОД: 3000 ЦЕЛЬ: 3200 СТОП: 2800";
        let fields = parse_structured(text).expect("structured match");
        assert_eq!(fields.coin, "ETH");
        assert_eq!(fields.entry, Some(ParsedPrice::Single(dec!(3000))));
        assert_eq!(fields.targets, vec![dec!(3200)]);
        assert_eq!(fields.stop_loss, Some(StopLoss::Price(dec!(2800))));
        // no explicit word, target above entry
        assert_eq!(fields.direction, Direction::Long);
    }

    #[test]
    fn test_percent_stop() {
        let text = "COIN: SOL Direction: SHORT ENTRY: 150 STOP LOSS: 5%";
        let fields = parse_structured(text).expect("structured match");
        assert_eq!(fields.stop_loss, Some(StopLoss::Percent(5.0)));
        assert_eq!(fields.direction, Direction::Short);
    }

    #[test]
    fn test_unlabeled_text_rejected() {
        assert!(parse_structured("BTC LONG Entry: 50000 Target: 55000").is_none());
        assert!(parse_structured("just talking about the COIN: BTC today").is_none());
    }

    #[test]
    fn test_tp_numbered_targets() {
        let text = "PAIR: AVAX LONG ENTRY: 30 TP1: 33 TP2: 36 SL: 28";
        let fields = parse_structured(text).expect("structured match");
        assert_eq!(fields.targets, vec![dec!(33), dec!(36)]);
    }
}
