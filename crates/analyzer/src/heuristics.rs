//! The six risk evaluators.
//!
//! Each evaluator is a pure function of the decoded transaction, the
//! reference sets, and [`HeuristicConfig`]. [`run_all`] always runs all six
//! and returns them in a fixed order; nothing short-circuits.

use alloy_primitives::U256;
use serde_json::json;
use txguard_core::units::{format_ether, WEI_PER_ETHER};
use txguard_core::{
    DecodedTransaction, HeuristicKind, HeuristicResult, HeuristicResults, KnownFunction, RiskLevel,
};
use txguard_provider::ReferenceSets;

/// Approvals above one million tokens (at 18 decimals) count as unlimited.
///
/// `10^24`, i.e. `1_000_000 * WEI_PER_ETHER`, spelled as little-endian limbs
/// so it can be a `const`.
pub const UNLIMITED_APPROVAL_FLOOR: U256 = U256::from_limbs([0x1bce_cced_a100_0000, 0xd3c2, 0, 0]);

/// Tunables for the evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicConfig {
    /// Native value (wei) strictly above which a transfer is flagged.
    pub high_value_threshold: U256,
    /// Approval amount strictly above which an allowance is treated as unlimited.
    pub unlimited_approval_floor: U256,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: WEI_PER_ETHER,
            unlimited_approval_floor: UNLIMITED_APPROVAL_FLOOR,
        }
    }
}

impl HeuristicConfig {
    pub fn with_high_value_threshold(mut self, threshold: U256) -> Self {
        self.high_value_threshold = threshold;
        self
    }
}

/// Runs every evaluator in display order.
pub fn run_all(
    tx: &DecodedTransaction,
    refs: &ReferenceSets,
    config: &HeuristicConfig,
) -> HeuristicResults {
    let mut results = HeuristicResults::new();
    results.push(check_known_malicious(tx, refs));
    results.push(check_unlimited_approval(tx, config));
    results.push(check_increase_allowance(tx));
    results.push(check_high_value(tx, config));
    results.push(check_drainer_signature(tx, refs));
    results.push(check_nft_approval_for_all(tx));
    results
}

pub fn check_known_malicious(tx: &DecodedTransaction, refs: &ReferenceSets) -> HeuristicResult {
    let kind = HeuristicKind::KnownMalicious;
    let Some(to) = tx.to else {
        return HeuristicResult::pass(kind, RiskLevel::Low, "No target contract to check");
    };

    let flagged = refs.is_malicious(&to);
    let result = if flagged {
        HeuristicResult::fail(
            kind,
            RiskLevel::Critical,
            "This contract is flagged as malicious",
        )
    } else {
        HeuristicResult::pass(
            kind,
            RiskLevel::Low,
            "Contract not found in malicious database",
        )
    };
    result
        .with_detail("address", to.to_checksum(None))
        .with_detail("isKnownMalicious", flagged)
}

/// `approve` whose amount is the max word or above the configured floor.
///
/// The floor assumes 18 decimals, so low-decimal tokens are under-flagged.
pub fn check_unlimited_approval(
    tx: &DecodedTransaction,
    config: &HeuristicConfig,
) -> HeuristicResult {
    let kind = HeuristicKind::UnlimitedApproval;
    let amount = tx
        .is(KnownFunction::Approve)
        .then(|| tx.arg("amount").and_then(|v| v.as_uint()))
        .flatten();

    let Some(amount) = amount else {
        return HeuristicResult::pass(kind, RiskLevel::Low, "No approval-related risk detected");
    };

    let unlimited = amount == U256::MAX || amount > config.unlimited_approval_floor;
    let result = if unlimited {
        HeuristicResult::fail(
            kind,
            RiskLevel::Critical,
            "This approval sets an unlimited or extremely high allowance",
        )
    } else {
        HeuristicResult::pass(
            kind,
            RiskLevel::Low,
            "Approval amount is within reasonable limits",
        )
    };
    result
        .with_detail("amount", amount.to_string())
        .with_detail("isUnlimited", unlimited)
}

/// Advisory only: passes, but carries `medium` so the explanation can pick it up.
pub fn check_increase_allowance(tx: &DecodedTransaction) -> HeuristicResult {
    let kind = HeuristicKind::IncreaseAllowance;
    if !tx.is(KnownFunction::IncreaseAllowance) {
        return HeuristicResult::pass(kind, RiskLevel::Low, "No allowance increase detected");
    }

    let mut result = HeuristicResult::pass(
        kind,
        RiskLevel::Medium,
        "Increasing allowance - verify the new total amount",
    )
    .with_detail("function", KnownFunction::IncreaseAllowance.name());
    if let Some(added) = tx.arg("addedValue").and_then(|v| v.as_uint()) {
        result = result.with_detail("addedValue", added.to_string());
    }
    result
}

pub fn check_high_value(tx: &DecodedTransaction, config: &HeuristicConfig) -> HeuristicResult {
    let kind = HeuristicKind::HighValueTransfer;
    let value_eth = format_ether(tx.value);
    let high = tx.value > config.high_value_threshold;

    let result = if high {
        HeuristicResult::fail(
            kind,
            RiskLevel::High,
            format!("Large value transfer: {value_eth} ETH"),
        )
    } else {
        HeuristicResult::pass(
            kind,
            RiskLevel::Low,
            "Value transfer is within normal range",
        )
    };
    result
        .with_detail("value", tx.value.to_string())
        .with_detail("valueEth", value_eth)
        .with_detail("threshold", config.high_value_threshold.to_string())
}

pub fn check_drainer_signature(tx: &DecodedTransaction, refs: &ReferenceSets) -> HeuristicResult {
    let kind = HeuristicKind::DrainerSignature;
    let Some(selector) = tx.selector() else {
        return HeuristicResult::pass(kind, RiskLevel::Low, "No function call detected");
    };

    let drainer = refs.is_drainer_selector(&selector);
    let result = if drainer {
        HeuristicResult::fail(
            kind,
            RiskLevel::Critical,
            "This function signature matches known drainer patterns",
        )
    } else {
        HeuristicResult::pass(kind, RiskLevel::Low, "Function signature appears safe")
    };
    result
        .with_detail("functionSignature", selector.to_string())
        .with_detail("isDrainer", drainer)
}

pub fn check_nft_approval_for_all(tx: &DecodedTransaction) -> HeuristicResult {
    let kind = HeuristicKind::NftApprovalForAll;
    let approved = tx
        .is(KnownFunction::SetApprovalForAll)
        .then(|| tx.arg("approved").and_then(|v| v.as_bool()))
        .flatten();

    let Some(approved) = approved else {
        return HeuristicResult::pass(kind, RiskLevel::Low, "No NFT approval risk detected");
    };

    let result = if approved {
        HeuristicResult::fail(
            kind,
            RiskLevel::High,
            "This grants approval for ALL your NFTs to this contract",
        )
    } else {
        HeuristicResult::pass(kind, RiskLevel::Low, "Revoking approval for all NFTs")
    };
    let operator = tx
        .arg("operator")
        .map(|v| json!(v.to_string()))
        .unwrap_or(serde_json::Value::Null);
    result
        .with_detail("approved", approved)
        .with_detail("operator", operator)
}
