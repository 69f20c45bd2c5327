// Signal Analysis (Layer 2)
// Independent enrichment stages run over extracted signals: validation,
// quality / risk-reward scoring, lexicon sentiment, and the adaptive
// weighted classifier. Each stage only appends to its own part of the
// signal; none of them ever removes a signal from a batch.

pub mod classifier;
pub mod lexicon;
pub mod quality;
pub mod sentiment;
pub mod validator;

pub use classifier::{
    AdaptiveClassifier, ClassifierState, MlPrediction, RecommendedAction, RiskLevel,
};
pub use lexicon::SentimentLexicon;
pub use quality::{QualityReport, QualityScorer, RiskBucket, RewardBucket};
pub use sentiment::{
    EmotionBreakdown, MarketSentiment, SentimentAnalyzer, SentimentLabel, SentimentResult,
};
pub use validator::SignalValidator;
