//! Calldata decoding, risk heuristics, scoring, simulation, explanation, and
//! the analysis pipeline that ties them together.

pub mod catalog;
pub mod decoder;
pub mod explain;
pub mod heuristics;
pub mod pipeline;
pub mod reporter;
pub mod revoke;
pub mod scoring;
pub mod simulator;
pub mod sink;

pub use decoder::{decode, decode_offline, decode_raw};
pub use explain::{Explainer, FallbackExplainer, PromptExplainer, TextGenerator};
pub use heuristics::HeuristicConfig;
pub use pipeline::{assess, score_batch, AnalysisRequest, Analyzer, Assessment};
pub use revoke::{prepare_revoke, RevokeTransaction};
pub use simulator::{estimate_value_at_risk, simulate};
