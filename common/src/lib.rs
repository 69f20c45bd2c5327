// Shared kernel for the signal intelligence pipeline
// Data model, injected configuration snapshots, and the enrichment error taxonomy

pub mod config;
pub mod error;
pub mod signal;
pub mod stats;

pub use config::{AssetCatalog, AssetClass, PipelineSettings, PriceBand, PriceBands, VenueCatalog};
pub use error::EnrichmentError;
pub use stats::{ChannelStats, SignalOutcome};
pub use signal::{
    Direction, EntryPrice, ExtractionTier, Platform, QualityTier, Severity, Signal, SignalScores,
    SourceInfo, StopLoss, Timeframe, ValidationFinding,
};
