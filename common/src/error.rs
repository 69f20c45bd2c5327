// Enrichment error taxonomy
// Extraction yielding nothing is not an error (empty list). Validation
// findings attach to the signal. Only the enrichment stages can fail, and
// those failures are isolated per signal so a batch never aborts.

use thiserror::Error;

/// Failure inside one enrichment stage for one signal.
/// The pipeline degrades the affected dimension to a neutral score and
/// continues with the remaining signals.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// A scoring stage could not produce a score for this signal
    #[error("scoring failed in {stage} for signal {signal_id}: {reason}")]
    ScoringFailure {
        stage: &'static str,
        signal_id: String,
        reason: String,
    },

    /// Classifier feature extraction failed; the signal is reported as
    /// invalid with zero confidence and an IGNORE action
    #[error("classifier failed for signal {signal_id}: {reason}")]
    ClassifierFailure { signal_id: String, reason: String },
}

impl EnrichmentError {
    pub fn scoring(stage: &'static str, signal_id: &str, reason: impl Into<String>) -> Self {
        Self::ScoringFailure {
            stage,
            signal_id: signal_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn classifier(signal_id: &str, reason: impl Into<String>) -> Self {
        Self::ClassifierFailure {
            signal_id: signal_id.to_string(),
            reason: reason.into(),
        }
    }
}
