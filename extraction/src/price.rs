// Price parsing
// Chat prices arrive as "45k", "0,5", "45,000", "$112207" and
// "112207-110500" zones. Everything parses into Decimal so downstream
// risk math never loses precision.

use rust_decimal::Decimal;
use std::str::FromStr;

/// A parsed price expression: a single price or a low/high zone
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPrice {
    Single(Decimal),
    Range { low: Decimal, high: Decimal },
}

/// Parse one price token. Handles a leading '$', "k"/"m" magnitude
/// suffixes, thousands separators and comma decimal separators.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let mut token = raw.trim().trim_start_matches('$').to_string();
    if token.is_empty() {
        return None;
    }

    let mut multiplier = Decimal::ONE;
    let lower = token.to_lowercase();
    if let Some(stripped) = lower.strip_suffix('k') {
        token = stripped.to_string();
        multiplier = Decimal::from(1_000);
    } else if let Some(stripped) = lower.strip_suffix('m') {
        token = stripped.to_string();
        multiplier = Decimal::from(1_000_000);
    }

    token = normalize_separators(token.trim_end_matches('.'));
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    Decimal::from_str(&token).ok().map(|d| d * multiplier)
}

/// Disambiguate commas: "45,000" is a thousands separator, "0,5" is a
/// decimal comma. A comma followed by exactly three digits (and no dot in
/// the token) groups thousands; any other comma is a decimal point.
fn normalize_separators(token: &str) -> String {
    if !token.contains(',') {
        return token.to_string();
    }
    if token.contains('.') {
        // dot is already the decimal point, commas group thousands
        return token.replace(',', "");
    }
    let parts: Vec<&str> = token.split(',').collect();
    let grouping = parts.len() >= 2
        && parts[1..].iter().all(|p| p.len() == 3)
        && !parts[0].is_empty();
    if grouping {
        parts.concat()
    } else {
        token.replacen(',', ".", 1)
    }
}

/// Parse a price or an "A - B" zone. Zones are stored low/high regardless
/// of the order they were written in.
pub fn parse_price_or_range(raw: &str) -> Option<ParsedPrice> {
    let trimmed = raw.trim();
    if let Some((a, b)) = split_range(trimmed) {
        let first = parse_price(a)?;
        let second = parse_price(b)?;
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        return Some(ParsedPrice::Range { low, high });
    }
    parse_price(trimmed).map(ParsedPrice::Single)
}

/// Split "A - B" on the dash that separates two numbers. Returns None for
/// single prices and for negative-looking inputs.
fn split_range(raw: &str) -> Option<(&str, &str)> {
    let (idx, sep) = raw
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-' || *c == '–')?;
    let a = &raw[..idx];
    let b = &raw[idx + sep.len_utf8()..];
    if a.trim().is_empty() || b.trim().is_empty() {
        return None;
    }
    Some((a, b))
}

/// Parse a separated list of prices ("113500-114800-117000",
/// "55000, 58000 / 60000") preserving order.
pub fn parse_price_list(raw: &str) -> Vec<Decimal> {
    raw.split(|c: char| c == '-' || c == '–' || c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.trim().is_empty())
        .filter_map(parse_price)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_prices() {
        assert_eq!(parse_price("50000"), Some(dec!(50000)));
        assert_eq!(parse_price("$50000"), Some(dec!(50000)));
        assert_eq!(parse_price("0.45"), Some(dec!(0.45)));
    }

    #[test]
    fn test_magnitude_suffixes() {
        assert_eq!(parse_price("45k"), Some(dec!(45000)));
        assert_eq!(parse_price("45K"), Some(dec!(45000)));
        assert_eq!(parse_price("1.2m"), Some(dec!(1200000)));
    }

    #[test]
    fn test_comma_handling() {
        assert_eq!(parse_price("45,000"), Some(dec!(45000)));
        assert_eq!(parse_price("1,234,567"), Some(dec!(1234567)));
        assert_eq!(parse_price("0,5"), Some(dec!(0.5)));
        assert_eq!(parse_price("112,5"), Some(dec!(112.5)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("moon"), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn test_range_normalized_low_high() {
        assert_eq!(
            parse_price_or_range("112207-110500"),
            Some(ParsedPrice::Range {
                low: dec!(110500),
                high: dec!(112207),
            })
        );
        assert_eq!(
            parse_price_or_range("48k - 50k"),
            Some(ParsedPrice::Range {
                low: dec!(48000),
                high: dec!(50000),
            })
        );
        assert_eq!(
            parse_price_or_range("50000"),
            Some(ParsedPrice::Single(dec!(50000)))
        );
    }

    #[test]
    fn test_en_dash_ranges() {
        assert_eq!(
            parse_price_or_range("48k\u{2013}50k"),
            Some(ParsedPrice::Range {
                low: dec!(48000),
                high: dec!(50000),
            })
        );
        // dangling separators must not panic or produce a range
        assert_eq!(parse_price_or_range("5\u{2013}"), None);
        assert_eq!(parse_price_or_range("5-"), None);
        assert_eq!(parse_price_or_range("\u{2013}5"), None);
    }

    #[test]
    fn test_price_list() {
        assert_eq!(
            parse_price_list("113500-114800-117000"),
            vec![dec!(113500), dec!(114800), dec!(117000)]
        );
        assert_eq!(
            parse_price_list("55000, 58000 / 60k"),
            vec![dec!(55000), dec!(58000), dec!(60000)]
        );
    }
}
