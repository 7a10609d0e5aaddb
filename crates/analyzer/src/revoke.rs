//! Builds the unsigned transaction that zeroes an ERC-20 allowance.

use crate::catalog::IERC20;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;
use txguard_core::error::{GuardError, GuardResult};

pub const REVOKE_NOTE: &str =
    "Sign this transaction with your wallet to revoke the approval. This sets the allowance to 0.";

/// Unsigned `approve(spender, 0)` ready for a wallet to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: String,
    pub note: String,
}

pub fn prepare_revoke(token: Address, spender: Address) -> RevokeTransaction {
    let data = IERC20::approveCall {
        spender,
        amount: U256::ZERO,
    }
    .abi_encode();

    RevokeTransaction {
        to: token,
        data: data.into(),
        value: "0".into(),
        note: REVOKE_NOTE.into(),
    }
}

/// String-input variant for callers holding unvalidated addresses.
pub fn prepare_revoke_str(token: &str, spender: &str) -> GuardResult<RevokeTransaction> {
    let token = parse_address("token", token)?;
    let spender = parse_address("spender", spender)?;
    Ok(prepare_revoke(token, spender))
}

fn parse_address(field: &str, s: &str) -> GuardResult<Address> {
    s.trim()
        .parse()
        .map_err(|e| GuardError::InvalidInput(format!("{field} {s:?}: {e}")))
}
