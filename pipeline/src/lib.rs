// Pipeline (Layer 3)
// Orchestrates extraction and analysis over whole batches: source fan-out,
// per-message processing, dedup and ranking, outcome tracking, and the
// in-memory signal store.

pub mod aggregator;
pub mod outcomes;
pub mod pipeline;
pub mod source;
pub mod storage;

pub use aggregator::SignalAggregator;
pub use outcomes::OutcomeTracker;
pub use pipeline::{BatchReport, CollectionReport, EnrichmentFailure, SignalPipeline};
pub use source::{InboundMessage, MessageSource, StaticSource};
pub use storage::InMemorySignalStore;
