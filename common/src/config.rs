// Injected configuration snapshots
// The pipeline only ever reads an immutable snapshot during one run; an
// out-of-scope loader may refresh these between runs. Defaults carry the
// static data so the pipeline works out of the box.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Asset class used to select a price sanity band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssetClass {
    Btc,
    Eth,
    Stablecoin,
    Altcoin,
}

/// Canonical ticker whitelist with aliases.
/// Extraction owns the whitelist gate; validation re-checks it for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCatalog {
    /// Canonical tickers, uppercase
    pub tickers: BTreeSet<String>,
    /// Alias -> canonical ticker (aliases uppercase)
    pub aliases: BTreeMap<String, String>,
}

impl AssetCatalog {
    /// Resolve a raw candidate to a canonical ticker.
    /// Exact match first, then alias lookup, then cheap corrections:
    /// stripped pair suffixes, a leading '$', and edit distance 1 against
    /// the whitelist for fat-finger variants.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let candidate = raw.trim().trim_start_matches('$').to_uppercase();
        if candidate.is_empty() {
            return None;
        }
        if self.tickers.contains(&candidate) {
            return Some(candidate);
        }
        if let Some(canonical) = self.aliases.get(&candidate) {
            return Some(canonical.clone());
        }
        // Pair notation: BTC/USDT, BTCUSDT, BTC-PERP
        for suffix in ["/USDT", "/USD", "/BUSD", "USDT", "USD", "-PERP", "PERP"] {
            if let Some(stripped) = candidate.strip_suffix(suffix) {
                if self.tickers.contains(stripped) {
                    return Some(stripped.to_string());
                }
                if let Some(canonical) = self.aliases.get(stripped) {
                    return Some(canonical.clone());
                }
            }
        }
        // Single-edit typo against the whitelist, only for candidates of 4+
        // chars so short English caps words ("NOT", "LOL") never correct
        // into tickers
        if candidate.len() >= 4 {
            let mut matched: Option<&String> = None;
            for ticker in &self.tickers {
                if edit_distance_is_one(&candidate, ticker) {
                    if matched.is_some() {
                        return None; // ambiguous correction, drop it
                    }
                    matched = Some(ticker);
                }
            }
            return matched.cloned();
        }
        None
    }

    /// Suggest close tickers for validation messages
    pub fn suggestions(&self, raw: &str) -> Vec<String> {
        let candidate = raw.trim().trim_start_matches('$').to_uppercase();
        self.tickers
            .iter()
            .filter(|t| edit_distance_is_one(&candidate, t) || t.starts_with(&candidate))
            .take(3)
            .cloned()
            .collect()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.contains(&ticker.to_uppercase())
    }

    /// Asset class for price-band selection
    pub fn class_of(&self, ticker: &str) -> AssetClass {
        match ticker.to_uppercase().as_str() {
            "BTC" => AssetClass::Btc,
            "ETH" => AssetClass::Eth,
            "USDT" | "USDC" | "DAI" | "BUSD" => AssetClass::Stablecoin,
            _ => AssetClass::Altcoin,
        }
    }
}

/// True when strings are within one insert/delete/substitute of each other
fn edit_distance_is_one(a: &str, b: &str) -> bool {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    match long.len() - short.len() {
        0 => {
            let diffs = short.iter().zip(long.iter()).filter(|(x, y)| x != y).count();
            diffs == 1
        }
        1 => {
            // one deletion from the longer string
            let mut i = 0;
            let mut j = 0;
            let mut skipped = false;
            while i < short.len() && j < long.len() {
                if short[i] == long[j] {
                    i += 1;
                    j += 1;
                } else if skipped {
                    return false;
                } else {
                    skipped = true;
                    j += 1;
                }
            }
            true
        }
        _ => false,
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        let tickers: BTreeSet<String> = [
            "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK", "MATIC",
            "LTC", "ATOM", "UNI", "ARB", "OP", "APT", "SUI", "NEAR", "INJ", "TIA", "SEI", "PEPE",
            "SHIB", "TON", "TRX", "FIL", "AAVE", "USDT", "USDC",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let aliases: BTreeMap<String, String> = [
            ("BITCOIN", "BTC"),
            ("XBT", "BTC"),
            ("ETHEREUM", "ETH"),
            ("ETHER", "ETH"),
            ("SOLANA", "SOL"),
            ("RIPPLE", "XRP"),
            ("CARDANO", "ADA"),
            ("DOGECOIN", "DOGE"),
            ("AVALANCHE", "AVAX"),
            ("POLKADOT", "DOT"),
            ("CHAINLINK", "LINK"),
            ("POLYGON", "MATIC"),
            ("LITECOIN", "LTC"),
            ("COSMOS", "ATOM"),
            ("UNISWAP", "UNI"),
            ("ARBITRUM", "ARB"),
            ("OPTIMISM", "OP"),
            ("APTOS", "APT"),
            ("TONCOIN", "TON"),
            ("TRON", "TRX"),
            ("FILECOIN", "FIL"),
        ]
        .iter()
        .map(|(a, t)| (a.to_string(), t.to_string()))
        .collect();

        Self { tickers, aliases }
    }
}

/// Inclusive price sanity band for one asset class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceBand {
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Per-asset-class price sanity bands. Out-of-band prices are a warning,
/// not a rejection; garbled decimal separators show up here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBands {
    pub btc: PriceBand,
    pub eth: PriceBand,
    pub stablecoin: PriceBand,
    pub altcoin: PriceBand,
}

impl PriceBands {
    pub fn band_for(&self, class: AssetClass) -> &PriceBand {
        match class {
            AssetClass::Btc => &self.btc,
            AssetClass::Eth => &self.eth,
            AssetClass::Stablecoin => &self.stablecoin,
            AssetClass::Altcoin => &self.altcoin,
        }
    }
}

impl Default for PriceBands {
    fn default() -> Self {
        Self {
            btc: PriceBand {
                min: Decimal::from(1_000),
                max: Decimal::from(1_000_000),
            },
            eth: PriceBand {
                min: Decimal::from(50),
                max: Decimal::from(100_000),
            },
            stablecoin: PriceBand {
                min: Decimal::new(90, 2),  // 0.90
                max: Decimal::new(110, 2), // 1.10
            },
            altcoin: PriceBand {
                min: Decimal::new(1, 6), // 0.000001
                max: Decimal::from(50_000),
            },
        }
    }
}

/// Static per-venue tradable asset sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueCatalog {
    /// Venue name -> tradable tickers
    pub venues: BTreeMap<String, BTreeSet<String>>,
}

impl VenueCatalog {
    /// True when at least one configured venue lists the asset
    pub fn is_available(&self, ticker: &str) -> bool {
        let ticker = ticker.to_uppercase();
        self.venues.values().any(|assets| assets.contains(&ticker))
    }

    /// Venues listing the asset, for validation messages
    pub fn venues_for(&self, ticker: &str) -> Vec<String> {
        let ticker = ticker.to_uppercase();
        self.venues
            .iter()
            .filter(|(_, assets)| assets.contains(&ticker))
            .map(|(venue, _)| venue.clone())
            .collect()
    }
}

impl Default for VenueCatalog {
    fn default() -> Self {
        let make = |assets: &[&str]| -> BTreeSet<String> {
            assets.iter().map(|s| s.to_string()).collect()
        };
        let mut venues = BTreeMap::new();
        venues.insert(
            "binance_futures".to_string(),
            make(&[
                "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK", "MATIC",
                "LTC", "ATOM", "UNI", "ARB", "OP", "APT", "SUI", "NEAR", "INJ", "TIA", "SEI",
                "PEPE", "SHIB", "TON", "TRX", "FIL", "AAVE",
            ]),
        );
        venues.insert(
            "bybit_perp".to_string(),
            make(&[
                "BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK", "ARB", "OP",
                "APT", "SUI", "NEAR", "INJ", "PEPE", "TON",
            ]),
        );
        venues.insert(
            "coinbase_spot".to_string(),
            make(&[
                "BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK", "MATIC", "LTC",
                "ATOM", "UNI", "AAVE", "FIL", "USDT", "USDC",
            ]),
        );
        Self { venues }
    }
}

/// Tunables shared across pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Extractor-level confidence floor; weaker candidates are discarded
    pub min_extraction_confidence: f64,
    /// Ranked output cap after dedup
    pub max_ranked_signals: usize,
    /// Per-source fetch timeout in seconds
    pub source_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_extraction_confidence: 40.0,
            max_ranked_signals: 100,
            source_timeout_secs: 30,
        }
    }
}
