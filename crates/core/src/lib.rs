//! Domain models, shared types, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod types;
pub mod units;

pub use error::{GuardError, GuardResult};
pub use types::{
    AbiValue, AnalysisResult, CallRequest, DecodedTransaction, Explanation, FunctionArgs,
    HeuristicKind, HeuristicResult, HeuristicResults, HeuristicScore, InputSource, KnownFunction,
    RawTransaction, RiskLabel, RiskLevel, RiskScore, SimulationResult, StateChange,
    StateChangeKind, TokenStandard, Transaction, TransactionInput, UnsignedTx, ValueAtRisk,
};
