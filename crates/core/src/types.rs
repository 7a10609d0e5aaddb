//! Domain types for the txguard risk analyzer.

use crate::error::{GuardError, GuardResult};
use alloy_primitives::{Address, Bytes, Selector, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Caller input
// ---------------------------------------------------------------------------

/// Transaction as supplied by the caller, in one of three shapes.
///
/// Fields are kept as the raw strings the caller sent so the input can be
/// echoed back unchanged in the [`AnalysisResult`]. [`source`](Self::source)
/// parses and resolves the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned_tx: Option<UnsignedTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calldata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// An unsigned transaction object. Gas fields are accepted but unused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTx {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

/// The resolved shape of a [`TransactionInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Needs an on-chain lookup before decoding.
    Hash(B256),
    /// Fully specified by the caller.
    Raw(RawTransaction),
}

/// `to` / `value` / `data` triple ready for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    /// `None` only for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl TransactionInput {
    /// Builds a `{to, calldata, value}` input.
    pub fn calldata(to: impl Into<String>, calldata: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            calldata: Some(calldata.into()),
            ..Self::default()
        }
    }

    /// Builds a transaction-hash input.
    pub fn hash(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: Some(tx_hash.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Resolves which shape is present. Precedence: hash, unsigned, calldata.
    pub fn source(&self) -> GuardResult<InputSource> {
        if let Some(hash) = &self.tx_hash {
            let hash = hash
                .trim()
                .parse::<B256>()
                .map_err(|e| GuardError::InvalidInput(format!("txHash {hash:?}: {e}")))?;
            return Ok(InputSource::Hash(hash));
        }

        if let Some(tx) = &self.unsigned_tx {
            return Ok(InputSource::Raw(RawTransaction {
                to: Some(parse_address(&tx.to, "unsignedTx.to")?),
                value: parse_quantity(tx.value.as_deref(), "unsignedTx.value")?,
                data: parse_data(tx.data.as_deref(), "unsignedTx.data")?,
            }));
        }

        if let (Some(calldata), Some(to)) = (&self.calldata, &self.to) {
            return Ok(InputSource::Raw(RawTransaction {
                to: Some(parse_address(to, "to")?),
                value: parse_quantity(self.value.as_deref(), "value")?,
                data: parse_data(Some(calldata), "calldata")?,
            }));
        }

        Err(GuardError::InvalidInput(
            "expected one of txHash, unsignedTx, or calldata with to".into(),
        ))
    }
}

fn parse_address(s: &str, field: &str) -> GuardResult<Address> {
    s.trim()
        .parse::<Address>()
        .map_err(|e| GuardError::InvalidInput(format!("{field} {s:?}: {e}")))
}

/// Decimal or `0x`-hex integer. Missing or empty means zero.
fn parse_quantity(s: Option<&str>, field: &str) -> GuardResult<U256> {
    match s.map(str::trim) {
        None | Some("") => Ok(U256::ZERO),
        Some(v) => v
            .parse::<U256>()
            .map_err(|e| GuardError::InvalidInput(format!("{field} {v:?}: {e}"))),
    }
}

/// `0x`-prefixed hex bytes. Missing, empty, or bare `0x` means no data.
fn parse_data(s: Option<&str>, field: &str) -> GuardResult<Bytes> {
    match s.map(str::trim) {
        None | Some("") | Some("0x") | Some("0X") => Ok(Bytes::new()),
        Some(v) => v
            .parse::<Bytes>()
            .map_err(|e| GuardError::InvalidInput(format!("{field}: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Chain-side transaction
// ---------------------------------------------------------------------------

/// Lightweight EVM transaction -- only the fields the analyzer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    /// `Bytes` (ref-counted) for zero-copy sharing through the pipeline.
    pub input: Bytes,
    pub value: U256,
    pub gas: u64,
}

impl From<Transaction> for RawTransaction {
    fn from(tx: Transaction) -> Self {
        Self {
            to: tx.to,
            value: tx.value,
            data: tx.input,
        }
    }
}

/// Read-only call request (`eth_call` / `eth_estimateGas`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    /// `None` simulates a contract creation.
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

// ---------------------------------------------------------------------------
// Decoded transaction
// ---------------------------------------------------------------------------

/// Interface family a selector was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC-20")]
    Erc20,
    #[serde(rename = "ERC-721")]
    Erc721,
}

/// Functions in the fixed decoding catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KnownFunction {
    Transfer,
    Approve,
    TransferFrom,
    IncreaseAllowance,
    SetApprovalForAll,
    SafeTransferFrom,
}

impl KnownFunction {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Approve => "approve",
            Self::TransferFrom => "transferFrom",
            Self::IncreaseAllowance => "increaseAllowance",
            Self::SetApprovalForAll => "setApprovalForAll",
            Self::SafeTransferFrom => "safeTransferFrom",
        }
    }
}

impl fmt::Display for KnownFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded ABI argument.
///
/// Serializes addresses checksummed and integers as decimal strings so
/// 256-bit values survive JSON consumers that only have doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{a}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Address(a) => serializer.collect_str(a),
            Self::Uint(v) => serializer.collect_str(v),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Decoded argument map, sorted by name for stable output.
pub type FunctionArgs = BTreeMap<&'static str, AbiValue>;

/// Read-only, human-oriented view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    pub to: Option<Address>,
    #[serde(with = "decimal")]
    pub value: U256,
    pub data: Bytes,
    #[serde(rename = "functionName", skip_serializing_if = "Option::is_none")]
    pub function: Option<KnownFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<TokenStandard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_args: Option<FunctionArgs>,
    pub human_readable: String,
    pub is_contract_interaction: bool,
}

impl DecodedTransaction {
    /// First four bytes of calldata, if there are at least four.
    pub fn selector(&self) -> Option<Selector> {
        self.data.get(..4).map(Selector::from_slice)
    }

    pub fn arg(&self, name: &str) -> Option<&AbiValue> {
        self.function_args.as_ref()?.get(name)
    }

    pub fn is(&self, function: KnownFunction) -> bool {
        self.function == Some(function)
    }
}

// ---------------------------------------------------------------------------
// Heuristics and scoring
// ---------------------------------------------------------------------------

/// Severity tier of a heuristic, and the level of an aggregate score.
///
/// Ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `>= 85` critical, `>= 60` high, `>= 30` medium, else low.
    pub const fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::Critical,
            60..=84 => Self::High,
            30..=59 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-tier label, finer-grained than [`RiskLevel`] at the low end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Safe,
    Caution,
    Risky,
    Dangerous,
    #[serde(rename = "Critical Risk")]
    CriticalRisk,
}

impl RiskLabel {
    pub const fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::CriticalRisk,
            60..=84 => Self::Dangerous,
            30..=59 => Self::Risky,
            10..=29 => Self::Caution,
            _ => Self::Safe,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Caution => "Caution",
            Self::Risky => "Risky",
            Self::Dangerous => "Dangerous",
            Self::CriticalRisk => "Critical Risk",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which evaluator produced a [`HeuristicResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    KnownMalicious,
    UnlimitedApproval,
    IncreaseAllowance,
    HighValueTransfer,
    DrainerSignature,
    NftApprovalForAll,
}

impl HeuristicKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KnownMalicious => "known_malicious",
            Self::UnlimitedApproval => "unlimited_approval",
            Self::IncreaseAllowance => "increase_allowance",
            Self::HighValueTransfer => "high_value_transfer",
            Self::DrainerSignature => "drainer_signature",
            Self::NftApprovalForAll => "nft_approval_for_all",
        }
    }
}

/// One evaluator's verdict. `severity` only matters when `passed` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicResult {
    pub check: HeuristicKind,
    pub passed: bool,
    pub severity: RiskLevel,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<&'static str, serde_json::Value>,
}

impl HeuristicResult {
    pub fn pass(check: HeuristicKind, severity: RiskLevel, message: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            severity,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn fail(check: HeuristicKind, severity: RiskLevel, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            ..Self::pass(check, severity, message)
        }
    }

    pub fn with_detail(mut self, key: &'static str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key, value.into());
        self
    }
}

/// All six verdicts for one transaction, inline.
pub type HeuristicResults = SmallVec<[HeuristicResult; 6]>;

/// Output of aggregation: score and level, no label yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeuristicScore {
    pub score: u8,
    pub level: RiskLevel,
}

/// Final score with both level and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    pub score: u8,
    pub level: RiskLevel,
    pub label: RiskLabel,
}

impl From<HeuristicScore> for RiskScore {
    fn from(s: HeuristicScore) -> Self {
        Self {
            score: s.score,
            level: s.level,
            label: RiskLabel::from_score(s.score),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateChangeKind {
    Balance,
    Storage,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub address: Address,
    #[serde(rename = "type")]
    pub kind: StateChangeKind,
    pub before: String,
    pub after: String,
}

/// Outcome of the read-only call plus best-effort chain context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    /// Always empty: no state diffing is performed.
    pub state_changes: Vec<StateChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_at_risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_estimate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_is_contract: Option<bool>,
    #[serde(with = "decimal_opt", skip_serializing_if = "Option::is_none")]
    pub sender_balance: Option<U256>,
}

impl SimulationResult {
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Heuristic estimate of what the transaction exposes.
///
/// Only [`Amount`](Self::Amount) carries a number; the other variants render
/// as fixed sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueAtRisk {
    Amount(U256),
    Unlimited,
    AllNfts,
    Unknown,
}

impl fmt::Display for ValueAtRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(v) => f.write_str(&crate::units::format_ether(*v)),
            Self::Unlimited => f.write_str("Unlimited (check token balance)"),
            Self::AllNfts => f.write_str("All NFTs in collection"),
            Self::Unknown => f.write_str("Unknown (requires contract analysis)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Explanation and final result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
    pub recommendations: Vec<String>,
}

/// Everything produced for one analyzed transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    pub input_data: TransactionInput,
    pub risk_score: RiskScore,
    pub explanation: String,
    pub recommendations: Vec<String>,
    #[serde(rename = "decodedTx")]
    pub decoded: DecodedTransaction,
    pub heuristics: Vec<HeuristicResult>,
    #[serde(rename = "simulationResult")]
    pub simulation: SimulationResult,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// `U256` as a decimal string.
mod decimal {
    use alloy_primitives::U256;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(v: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }
}

mod decimal_opt {
    use alloy_primitives::U256;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(v: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(v) => s.collect_str(v),
            None => s.serialize_none(),
        }
    }
}
