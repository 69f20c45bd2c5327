// Signal Validator
// Independent checks that attach findings to a signal and set is_valid.
// Validation annotates for audit; it never removes a signal, so callers
// can always see why something was marked invalid.

use rust_decimal::Decimal;
use tracing::debug;

use common::{
    AssetCatalog, Direction, PriceBands, Severity, Signal, Timeframe, ValidationFinding,
    VenueCatalog,
};

/// Leverage bounds: outside [1, 100] is broken input, above 20 is a
/// warning-worthy gamble.
const LEVERAGE_MAX: u32 = 100;
const LEVERAGE_WARN: u32 = 20;

/// Timeframe suggested when a signal does not state one
const DEFAULT_TIMEFRAME: Timeframe = Timeframe::H4;

pub struct SignalValidator {
    catalog: AssetCatalog,
    bands: PriceBands,
    venues: VenueCatalog,
}

impl SignalValidator {
    pub fn new(catalog: AssetCatalog, bands: PriceBands, venues: VenueCatalog) -> Self {
        Self {
            catalog,
            bands,
            venues,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            AssetCatalog::default(),
            PriceBands::default(),
            VenueCatalog::default(),
        )
    }

    /// Run every check, attach the findings, and set is_valid.
    /// Returns the findings produced by this pass.
    pub fn validate(&self, signal: &mut Signal) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        self.check_asset(signal, &mut findings);
        self.check_direction(signal, &mut findings);
        self.check_price_logic(signal, &mut findings);
        self.check_price_bands(signal, &mut findings);
        self.check_leverage(signal, &mut findings);
        self.check_timeframe(signal, &mut findings);
        self.check_venue(signal, &mut findings);

        signal.validation.extend(findings.clone());
        signal.is_valid = !signal
            .validation
            .iter()
            .any(|f| f.severity == Severity::Critical);
        if !signal.is_valid {
            debug!(id = %signal.id, "signal marked invalid");
        }
        findings
    }

    fn check_asset(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        if self.catalog.contains(&signal.asset) {
            return;
        }
        let suggestions = self.catalog.suggestions(&signal.asset);
        let mut finding = ValidationFinding::critical(
            "asset",
            format!("'{}' is not a whitelisted ticker", signal.asset),
        );
        if !suggestions.is_empty() {
            finding = finding.with_suggestion(suggestions.join(", "));
        }
        findings.push(finding);
    }

    fn check_direction(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        if signal.direction == Direction::Hold && (signal.entry.is_priced() || !signal.targets.is_empty())
        {
            findings.push(ValidationFinding::info(
                "direction",
                "HOLD signal carries trade prices; direction may be misread",
            ));
        }
    }

    /// Price-direction ordering: for longs, stop < entry <= targets in
    /// ascending order; mirrored for shorts. HOLD and market entries skip.
    fn check_price_logic(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        let Some(entry) = signal.entry_price() else {
            return;
        };
        let bullish = signal.direction.is_bullish();
        let bearish = signal.direction.is_bearish();
        if !bullish && !bearish {
            return;
        }

        if let Some(first) = signal.targets.first() {
            let bad = if bullish { *first <= entry } else { *first >= entry };
            if bad {
                findings.push(ValidationFinding::critical(
                    "targets",
                    format!(
                        "{} target {} is on the wrong side of entry {}",
                        signal.direction.as_str(),
                        first,
                        entry
                    ),
                ));
            }
        }

        if !targets_monotonic(&signal.targets, bullish) {
            findings.push(ValidationFinding::critical(
                "targets",
                "targets are not ordered away from entry",
            ));
        }

        if let Some(stop) = signal.stop_price() {
            let bad = if bullish { stop >= entry } else { stop <= entry };
            if bad {
                findings.push(ValidationFinding::critical(
                    "stop_loss",
                    format!(
                        "{} stop {} is on the wrong side of entry {}",
                        signal.direction.as_str(),
                        stop,
                        entry
                    ),
                ));
            }
        }
    }

    fn check_price_bands(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        let Some(entry) = signal.entry_price() else {
            return;
        };
        let class = self.catalog.class_of(&signal.asset);
        let band = self.bands.band_for(class);
        if !band.contains(entry) {
            findings.push(ValidationFinding::warning(
                "entry",
                format!(
                    "entry {} is outside the {}..{} sanity band for this asset class",
                    entry, band.min, band.max
                ),
            ));
        }
    }

    fn check_leverage(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        let Some(raw) = signal.leverage.as_deref() else {
            return;
        };
        let Some(max_lev) = max_leverage(raw) else {
            findings.push(ValidationFinding::warning(
                "leverage",
                format!("could not read leverage '{}'", raw),
            ));
            return;
        };
        if max_lev < 1 || max_lev > LEVERAGE_MAX {
            findings.push(ValidationFinding::critical(
                "leverage",
                format!("leverage {}x is outside the 1-{}x bounds", max_lev, LEVERAGE_MAX),
            ));
        } else if max_lev > LEVERAGE_WARN {
            findings.push(ValidationFinding::warning(
                "leverage",
                format!("leverage {}x exceeds {}x", max_lev, LEVERAGE_WARN),
            ));
        }
    }

    fn check_timeframe(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        if signal.timeframe.is_none() {
            findings.push(
                ValidationFinding::warning("timeframe", "no recognized timeframe stated")
                    .with_suggestion(DEFAULT_TIMEFRAME.as_str()),
            );
        }
    }

    fn check_venue(&self, signal: &Signal, findings: &mut Vec<ValidationFinding>) {
        if !self.venues.is_available(&signal.asset) {
            findings.push(ValidationFinding::warning(
                "venue",
                format!("{} is not tradable on any configured venue", signal.asset),
            ));
        }
    }
}

/// Highest number in a leverage string like "10x" or "3-5x"
fn max_leverage(raw: &str) -> Option<u32> {
    raw.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<u32>().ok())
        .max()
}

fn targets_monotonic(targets: &[Decimal], ascending: bool) -> bool {
    targets.windows(2).all(|w| {
        if ascending {
            w[0] <= w[1]
        } else {
            w[0] >= w[1]
        }
    })
}
