//! Read-only call simulation and value-at-risk estimation.
//!
//! [`simulate`] issues one `eth_call` against the latest block, plus
//! best-effort context lookups run concurrently with it. It never fails:
//! chain errors become `success = false` with the message attached.
//! [`estimate_value_at_risk`] is independent of the call and works from the
//! decoded semantics only.

use alloy_eips::BlockId;
use alloy_primitives::{Address, U256};
use txguard_core::error::GuardResult;
use txguard_core::units::format_ether;
use txguard_core::{CallRequest, DecodedTransaction, KnownFunction, SimulationResult, ValueAtRisk};
use txguard_provider::ChainAccess;

pub const REVERT_MESSAGE: &str = "Transaction would revert";

/// Builds the call request for a decoded transaction.
pub fn call_request(tx: &DecodedTransaction, from: Option<Address>) -> CallRequest {
    CallRequest {
        from,
        to: tx.to,
        data: tx.data.clone(),
        value: tx.value,
    }
}

/// Simulates `tx` as sent by `from` (if given).
///
/// An empty return payload is read as a revert. Gas estimate, target code
/// presence, and sender balance are fetched alongside the call; each one
/// that fails is simply left empty.
pub async fn simulate<C>(
    tx: &DecodedTransaction,
    from: Option<Address>,
    chain: &C,
) -> SimulationResult
where
    C: ChainAccess + ?Sized,
{
    let request = call_request(tx, from);

    let (call, gas, code, balance) = tokio::join!(
        chain.call(&request, BlockId::latest()),
        chain.estimate_gas(&request),
        async {
            match tx.to {
                Some(to) => Some(chain.get_code(to).await),
                None => None,
            }
        },
        async {
            match from {
                Some(from) => Some(chain.get_balance(from).await),
                None => None,
            }
        },
    );

    let mut result = match call {
        Ok(output) if output.is_empty() => SimulationResult::reverted(REVERT_MESSAGE),
        Ok(output) => {
            tracing::debug!(bytes = output.len(), "call returned data");
            SimulationResult {
                success: true,
                ..SimulationResult::default()
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "simulation call failed");
            SimulationResult::reverted(e.to_string())
        }
    };

    result.gas_estimate = best_effort("estimate_gas", gas);
    result.target_is_contract = code
        .and_then(|c| best_effort("get_code", c))
        .map(|code| !code.is_empty());
    result.sender_balance = balance.and_then(|b| best_effort("get_balance", b));

    // A successful call from a known sender puts the attached value at risk.
    if result.success && from.is_some() && !tx.value.is_zero() {
        result.value_at_risk = Some(format_ether(tx.value));
    }

    result
}

fn best_effort<T>(what: &'static str, r: GuardResult<T>) -> Option<T> {
    match r {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(call = what, error = %e, "context lookup failed");
            None
        }
    }
}

/// What the transaction exposes, judged from its decoded form.
pub fn estimate_value_at_risk(tx: &DecodedTransaction) -> ValueAtRisk {
    if !tx.value.is_zero() && tx.data.is_empty() {
        return ValueAtRisk::Amount(tx.value);
    }

    let allowance = match tx.function {
        Some(KnownFunction::Approve) => tx.arg("amount"),
        Some(KnownFunction::IncreaseAllowance) => tx.arg("addedValue"),
        _ => None,
    };
    if let Some(amount) = allowance.and_then(|v| v.as_uint()) {
        return if amount == U256::MAX {
            ValueAtRisk::Unlimited
        } else {
            ValueAtRisk::Amount(amount)
        };
    }

    if tx.is(KnownFunction::SetApprovalForAll)
        && tx.arg("approved").and_then(|v| v.as_bool()) == Some(true)
    {
        return ValueAtRisk::AllNfts;
    }

    ValueAtRisk::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{IERC20, IERC721};
    use crate::decoder::decode_offline;
    use alloy_primitives::Bytes;
    use alloy_sol_types::SolCall;
    use txguard_core::units::WEI_PER_ETHER;
    use txguard_core::TransactionInput;
    use txguard_provider::mock::MockChain;

    const TARGET: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

    fn decoded(data: Vec<u8>) -> DecodedTransaction {
        decode_offline(&TransactionInput::calldata(TARGET, Bytes::from(data).to_string())).unwrap()
    }

    fn eth_transfer(wei: &str) -> DecodedTransaction {
        decode_offline(&TransactionInput::calldata(TARGET, "0x").with_value(wei)).unwrap()
    }

    #[test]
    fn plain_transfer_risks_its_value() {
        let var = estimate_value_at_risk(&eth_transfer("1500000000000000000"));
        assert_eq!(var, ValueAtRisk::Amount(U256::from(1_500_000_000_000_000_000u64)));
        assert_eq!(var.to_string(), "1.5");
    }

    #[test]
    fn max_approval_is_unlimited() {
        let tx = decoded(
            IERC20::approveCall {
                spender: Address::repeat_byte(1),
                amount: U256::MAX,
            }
            .abi_encode(),
        );
        assert_eq!(
            estimate_value_at_risk(&tx).to_string(),
            "Unlimited (check token balance)"
        );
    }

    #[test]
    fn increase_allowance_risks_added_value() {
        let tx = decoded(
            IERC20::increaseAllowanceCall {
                spender: Address::repeat_byte(1),
                addedValue: WEI_PER_ETHER * U256::from(3),
            }
            .abi_encode(),
        );
        assert_eq!(estimate_value_at_risk(&tx).to_string(), "3.0");
    }

    #[test]
    fn max_increase_allowance_is_unlimited() {
        let tx = decoded(
            IERC20::increaseAllowanceCall {
                spender: Address::repeat_byte(1),
                addedValue: U256::MAX,
            }
            .abi_encode(),
        );
        assert_eq!(estimate_value_at_risk(&tx), ValueAtRisk::Unlimited);
        assert_eq!(
            estimate_value_at_risk(&tx).to_string(),
            "Unlimited (check token balance)"
        );
    }

    #[test]
    fn blanket_nft_approval_risks_collection() {
        let tx = decoded(
            IERC721::setApprovalForAllCall {
                operator: Address::repeat_byte(2),
                approved: true,
            }
            .abi_encode(),
        );
        assert_eq!(estimate_value_at_risk(&tx).to_string(), "All NFTs in collection");
    }

    #[test]
    fn other_calls_are_unknown() {
        let tx = decoded(
            IERC20::transferCall {
                to: Address::repeat_byte(2),
                amount: U256::from(5),
            }
            .abi_encode(),
        );
        assert_eq!(estimate_value_at_risk(&tx), ValueAtRisk::Unknown);
        assert_eq!(estimate_value_at_risk(&eth_transfer("0")), ValueAtRisk::Unknown);
    }

    #[tokio::test]
    async fn empty_return_is_revert() {
        let chain = MockChain::builder()
            .with_call_result(Bytes::new())
            .with_gas_estimate(21_000)
            .build();
        let sim = simulate(&eth_transfer("1"), None, &chain).await;
        assert!(!sim.success);
        assert_eq!(sim.error.as_deref(), Some(REVERT_MESSAGE));
        assert!(sim.state_changes.is_empty());
        assert_eq!(sim.gas_estimate, Some(21_000));
    }

    #[tokio::test]
    async fn returned_data_is_success_with_context() {
        let from = Address::repeat_byte(0xfe);
        let chain = MockChain::builder()
            .with_call_result(Bytes::from_static(&[0u8; 32]))
            .with_code(TARGET.parse().unwrap(), Bytes::from_static(&[0x60, 0x80]))
            .with_balance(from, WEI_PER_ETHER)
            .build();
        let sim = simulate(&eth_transfer("2000000000000000000"), Some(from), &chain).await;
        assert!(sim.success);
        assert_eq!(sim.error, None);
        assert_eq!(sim.target_is_contract, Some(true));
        assert_eq!(sim.sender_balance, Some(WEI_PER_ETHER));
        assert_eq!(sim.value_at_risk.as_deref(), Some("2.0"));
        // No gas estimate configured: absent, not an error.
        assert_eq!(sim.gas_estimate, None);

        let calls = chain.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].from, Some(from));
        assert_eq!(calls[0].value, WEI_PER_ETHER * U256::from(2));
    }

    #[tokio::test]
    async fn chain_error_is_absorbed() {
        let chain = MockChain::builder()
            .with_call_error("execution reverted: paused")
            .build();
        let sim = simulate(&eth_transfer("0"), None, &chain).await;
        assert!(!sim.success);
        assert!(sim.error.unwrap().contains("execution reverted: paused"));
        assert_eq!(sim.target_is_contract, Some(false));
        assert_eq!(sim.sender_balance, None);
    }
}
