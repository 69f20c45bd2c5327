// Signal Extraction (Layer 1)
// Turns unstructured source text into candidate Signals: normalization,
// a structured fast path for labeled-field blocks, and a priority-ordered
// heuristic cascade for free-form messages.

pub mod cascade;
pub mod extractor;
pub mod normalizer;
pub mod price;
pub mod structured;

pub use extractor::{MessageMeta, SignalExtractor};
pub use normalizer::normalize_text;
pub use price::{parse_price, parse_price_list, parse_price_or_range, ParsedPrice};
pub use structured::StructuredFields;
