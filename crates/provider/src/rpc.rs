//! JSON-RPC chain access backed by alloy-rs.

use crate::ChainAccess;
use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;
use txguard_core::error::{GuardError, GuardResult};
use txguard_core::{CallRequest, Transaction};

/// Per-request ceiling. Requests are never retried.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads chain state from an Ethereum JSON-RPC endpoint.
///
/// ```ignore
/// let provider = RpcProvider::connect("https://mainnet.base.org").await?;
/// ```
pub struct RpcProvider {
    provider: DynProvider,
    rpc_url: String,
    timeout: Duration,
}

impl RpcProvider {
    pub async fn connect(rpc_url: &str) -> GuardResult<Self> {
        if rpc_url.is_empty() {
            return Err(GuardError::InvalidInput("RPC URL must not be empty".into()));
        }
        url::Url::parse(rpc_url)
            .map_err(|e| GuardError::InvalidInput(format!("Invalid RPC URL {rpc_url}: {e}")))?;

        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| GuardError::Provider(format!("Failed to connect to {rpc_url}: {e}")))?;

        tracing::info!(rpc_url, "connected");

        Ok(Self {
            provider: provider.erased(),
            rpc_url: rpc_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request timeout (default: 10s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn timed<T, E, F>(&self, method: &str, request: F) -> GuardResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(GuardError::Provider(format!("{method}: {e}"))),
            Err(_) => Err(GuardError::Provider(format!(
                "{method}: timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

fn to_request(request: &CallRequest) -> TransactionRequest {
    TransactionRequest {
        from: request.from,
        to: Some(match request.to {
            Some(addr) => TxKind::Call(addr),
            None => TxKind::Create,
        }),
        value: (!request.value.is_zero()).then_some(request.value),
        input: TransactionInput::new(request.data.clone()),
        ..Default::default()
    }
}

#[async_trait]
impl ChainAccess for RpcProvider {
    async fn get_transaction_by_hash(&self, hash: B256) -> GuardResult<Option<Transaction>> {
        use alloy_consensus::transaction::Transaction as TxTrait;

        tracing::debug!(%hash, rpc_url = %self.rpc_url, "fetching transaction");

        let tx = self
            .timed(
                "eth_getTransactionByHash",
                self.provider.get_transaction_by_hash(hash),
            )
            .await?;

        Ok(tx.map(|tx| Transaction {
            hash: *tx.inner.tx_hash(),
            from: tx.inner.signer(),
            to: tx.to(),
            input: tx.input().clone(),
            value: tx.value(),
            gas: tx.gas_limit(),
        }))
    }

    async fn call(&self, request: &CallRequest, block: BlockId) -> GuardResult<Bytes> {
        tracing::debug!(to = ?request.to, bytes = request.data.len(), "eth_call");
        self.timed(
            "eth_call",
            self.provider.call(to_request(request)).block(block),
        )
        .await
    }

    async fn get_balance(&self, address: Address) -> GuardResult<U256> {
        self.timed("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    async fn get_code(&self, address: Address) -> GuardResult<Bytes> {
        self.timed("eth_getCode", self.provider.get_code_at(address))
            .await
    }

    async fn estimate_gas(&self, request: &CallRequest) -> GuardResult<u64> {
        self.timed(
            "eth_estimateGas",
            self.provider.estimate_gas(to_request(request)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_is_invalid() {
        assert!(matches!(
            RpcProvider::connect("").await,
            Err(GuardError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn malformed_url_is_invalid() {
        assert!(matches!(
            RpcProvider::connect("not a url").await,
            Err(GuardError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_value_is_omitted_from_request() {
        let req = to_request(&CallRequest {
            to: Some(Address::ZERO),
            ..CallRequest::default()
        });
        assert_eq!(req.value, None);
        assert_eq!(req.to, Some(TxKind::Call(Address::ZERO)));

        let create = to_request(&CallRequest {
            value: U256::from(1),
            ..CallRequest::default()
        });
        assert_eq!(create.to, Some(TxKind::Create));
        assert_eq!(create.value, Some(U256::from(1)));
    }
}
