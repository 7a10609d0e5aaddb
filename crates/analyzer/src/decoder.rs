//! Calldata decoder: caller input → [`DecodedTransaction`].
//!
//! Resolution (which may hit the chain for a hash) is split from decoding
//! (pure), so offline callers can decode without a provider.

use crate::catalog;
use txguard_core::error::{GuardError, GuardResult};
use txguard_core::units::format_ether;
use txguard_core::{DecodedTransaction, InputSource, RawTransaction, TransactionInput};
use txguard_provider::ChainAccess;

/// Calldata shorter than a selector is treated as a plain value transfer.
pub const SELECTOR_LEN: usize = 4;

/// Resolves the input (fetching by hash if needed) and decodes it.
pub async fn decode<C>(input: &TransactionInput, chain: &C) -> GuardResult<DecodedTransaction>
where
    C: ChainAccess + ?Sized,
{
    let raw = resolve(input, chain).await?;
    Ok(decode_raw(&raw))
}

/// Turns the input into a `to` / `value` / `data` triple.
///
/// Fails with `Resolution` when the chain does not know the hash.
pub async fn resolve<C>(input: &TransactionInput, chain: &C) -> GuardResult<RawTransaction>
where
    C: ChainAccess + ?Sized,
{
    match input.source()? {
        InputSource::Raw(raw) => Ok(raw),
        InputSource::Hash(hash) => {
            tracing::debug!(%hash, "resolving transaction by hash");
            chain
                .get_transaction_by_hash(hash)
                .await?
                .map(RawTransaction::from)
                .ok_or_else(|| GuardError::Resolution(hash.to_string()))
        }
    }
}

/// Decodes an input that carries its own calldata. Hash inputs are rejected.
pub fn decode_offline(input: &TransactionInput) -> GuardResult<DecodedTransaction> {
    match input.source()? {
        InputSource::Raw(raw) => Ok(decode_raw(&raw)),
        InputSource::Hash(_) => Err(GuardError::InvalidInput(
            "txHash inputs need chain access to resolve".into(),
        )),
    }
}

/// Pure decoding step. Never fails: anything unrecognised becomes an
/// "unknown function" summary.
pub fn decode_raw(raw: &RawTransaction) -> DecodedTransaction {
    let mut decoded = DecodedTransaction {
        to: raw.to,
        value: raw.value,
        data: raw.data.clone(),
        function: None,
        standard: None,
        function_args: None,
        human_readable: String::new(),
        is_contract_interaction: !raw.data.is_empty(),
    };

    let Some(to) = raw.to else {
        decoded.human_readable = format!(
            "Deploy a new contract ({} bytes of init code)",
            raw.data.len()
        );
        return decoded;
    };

    if raw.data.len() < SELECTOR_LEN {
        decoded.human_readable = if raw.value.is_zero() {
            "Empty transaction".to_string()
        } else {
            format!("Send {} ETH to {to}", format_ether(raw.value))
        };
        return decoded;
    }

    match catalog::match_call(&raw.data) {
        Some(m) => {
            decoded.function = Some(m.function);
            decoded.standard = Some(m.standard);
            decoded.function_args = Some(m.args);
            decoded.human_readable = m.summary;
        }
        None => {
            tracing::debug!(
                selector = ?decoded.selector(),
                %to,
                "no catalog match"
            );
            decoded.human_readable = format!("Call unknown function on {to}");
        }
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{IERC20, IERC721};
    use alloy_primitives::{Address, Bytes, B256, U256};
    use alloy_sol_types::SolCall;
    use txguard_core::units::WEI_PER_ETHER;
    use txguard_core::{AbiValue, KnownFunction, Transaction};
    use txguard_provider::mock::MockChain;

    const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    fn unlimited_approve_calldata() -> String {
        format!(
            "0x095ea7b3{:0>64}{}",
            "742d35cc6634c0532925a3b844bc9e7595f0beb0",
            "f".repeat(64)
        )
    }

    #[test]
    fn empty_calldata_is_plain_transfer() {
        let input = TransactionInput::calldata(RECIPIENT, "0x")
            .with_value("1000000000000000000");
        let tx = decode_offline(&input).unwrap();
        assert_eq!(tx.function, None);
        assert!(!tx.is_contract_interaction);
        assert_eq!(tx.value, WEI_PER_ETHER);
        assert_eq!(tx.data.to_string(), "0x");
        assert!(tx.human_readable.starts_with("Send 1.0 ETH to "));
    }

    #[test]
    fn zero_value_no_data_is_empty() {
        let tx = decode_offline(&TransactionInput::calldata(RECIPIENT, "0x")).unwrap();
        assert_eq!(tx.human_readable, "Empty transaction");
    }

    #[test]
    fn short_calldata_is_plain_transfer_but_contract_interaction() {
        let tx = decode_offline(&TransactionInput::calldata(RECIPIENT, "0x0102")).unwrap();
        assert_eq!(tx.function, None);
        assert!(tx.is_contract_interaction);
        assert_eq!(tx.human_readable, "Empty transaction");
    }

    #[test]
    fn unlimited_approve_reads_unlimited() {
        let input = TransactionInput::calldata(USDC_BASE, unlimited_approve_calldata());
        let tx = decode_offline(&input).unwrap();
        assert_eq!(tx.function, Some(KnownFunction::Approve));
        assert!(tx.is_contract_interaction);
        assert_eq!(tx.arg("amount"), Some(&AbiValue::Uint(U256::MAX)));
        assert_eq!(
            tx.human_readable,
            format!(
                "Approve unlimited tokens for {}",
                RECIPIENT.parse::<Address>().unwrap()
            )
        );
    }

    #[test]
    fn limited_approve_formats_amount() {
        let data = IERC20::approveCall {
            spender: Address::repeat_byte(9),
            amount: WEI_PER_ETHER * U256::from(50),
        }
        .abi_encode();
        let input = TransactionInput::calldata(USDC_BASE, Bytes::from(data).to_string());
        let tx = decode_offline(&input).unwrap();
        assert!(tx.human_readable.starts_with("Approve 50 tokens for "));
    }

    #[test]
    fn function_args_serialize_as_decimal_strings() {
        let input = TransactionInput::calldata(USDC_BASE, unlimited_approve_calldata());
        let tx = decode_offline(&input).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["functionName"], "approve");
        assert_eq!(json["value"], "0");
        assert_eq!(json["functionArgs"]["amount"], U256::MAX.to_string());
    }

    #[test]
    fn set_approval_for_all_decodes_operator() {
        let data = IERC721::setApprovalForAllCall {
            operator: Address::repeat_byte(3),
            approved: true,
        }
        .abi_encode();
        let input = TransactionInput::calldata(RECIPIENT, Bytes::from(data).to_string());
        let tx = decode_offline(&input).unwrap();
        assert_eq!(tx.function, Some(KnownFunction::SetApprovalForAll));
        assert_eq!(tx.arg("approved"), Some(&AbiValue::Bool(true)));
        assert!(tx.human_readable.contains("Granted"));
    }

    #[test]
    fn malformed_calldata_degrades_to_unknown() {
        // approve selector with a truncated argument block.
        let input = TransactionInput::calldata(USDC_BASE, "0x095ea7b30000000000");
        let tx = decode_offline(&input).unwrap();
        assert_eq!(tx.function, None);
        assert!(tx.function_args.is_none());
        assert!(tx.human_readable.starts_with("Call unknown function on "));
    }

    #[test]
    fn decoding_is_deterministic() {
        let input = TransactionInput::calldata(USDC_BASE, unlimited_approve_calldata());
        let a = serde_json::to_string(&decode_offline(&input).unwrap()).unwrap();
        let b = serde_json::to_string(&decode_offline(&input).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn offline_rejects_hash() {
        let input = TransactionInput::hash(B256::ZERO.to_string());
        assert!(matches!(
            decode_offline(&input),
            Err(GuardError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn hash_resolves_through_chain() {
        let hash = B256::repeat_byte(0xaa);
        let chain = MockChain::builder()
            .with_tx(Transaction {
                hash,
                from: Address::repeat_byte(1),
                to: Some(RECIPIENT.parse().unwrap()),
                input: Bytes::new(),
                value: WEI_PER_ETHER * U256::from(2),
                gas: 21_000,
            })
            .build();
        let tx = decode(&TransactionInput::hash(hash.to_string()), &chain)
            .await
            .unwrap();
        assert_eq!(tx.value, WEI_PER_ETHER * U256::from(2));
        assert!(tx.human_readable.starts_with("Send 2.0 ETH"));
    }

    #[tokio::test]
    async fn unknown_hash_is_resolution_error() {
        let chain = MockChain::builder().build();
        let err = decode(&TransactionInput::hash(B256::ZERO.to_string()), &chain)
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Resolution(_)));
    }

    #[test]
    fn creation_without_target() {
        let raw = RawTransaction {
            to: None,
            value: U256::ZERO,
            data: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]),
        };
        let tx = decode_raw(&raw);
        assert!(tx.is_contract_interaction);
        assert_eq!(
            tx.human_readable,
            "Deploy a new contract (5 bytes of init code)"
        );
    }
}
