//! In-memory [`ChainAccess`] for tests.

use crate::ChainAccess;
use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use txguard_core::error::{GuardError, GuardResult};
use txguard_core::{CallRequest, Transaction};

/// A mock chain that returns canned data populated via the builder.
///
/// Unknown balances and code default to zero / empty. `call` and
/// `estimate_gas` return the configured outcome for every request, or a
/// provider error when none was configured. Issued calls are recorded so
/// tests can assert on what the simulator sent.
pub struct MockChain {
    transactions: HashMap<B256, Transaction>,
    balances: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    call_result: Result<Bytes, String>,
    gas_estimate: Result<u64, String>,
    calls: Mutex<Vec<CallRequest>>,
}

impl MockChain {
    pub fn builder() -> MockChainBuilder {
        MockChainBuilder {
            transactions: HashMap::new(),
            balances: HashMap::new(),
            code: HashMap::new(),
            call_result: Err("no call result configured".into()),
            gas_estimate: Err("no gas estimate configured".into()),
        }
    }

    /// Requests passed to `call`, in order.
    pub fn recorded_calls(&self) -> Vec<CallRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

pub struct MockChainBuilder {
    transactions: HashMap<B256, Transaction>,
    balances: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    call_result: Result<Bytes, String>,
    gas_estimate: Result<u64, String>,
}

impl MockChainBuilder {
    pub fn with_tx(mut self, tx: Transaction) -> Self {
        self.transactions.insert(tx.hash, tx);
        self
    }

    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.code.insert(address, code);
        self
    }

    pub fn with_call_result(mut self, result: Bytes) -> Self {
        self.call_result = Ok(result);
        self
    }

    pub fn with_call_error(mut self, message: impl Into<String>) -> Self {
        self.call_result = Err(message.into());
        self
    }

    pub fn with_gas_estimate(mut self, gas: u64) -> Self {
        self.gas_estimate = Ok(gas);
        self
    }

    pub fn build(self) -> MockChain {
        MockChain {
            transactions: self.transactions,
            balances: self.balances,
            code: self.code,
            call_result: self.call_result,
            gas_estimate: self.gas_estimate,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChainAccess for MockChain {
    async fn get_transaction_by_hash(&self, hash: B256) -> GuardResult<Option<Transaction>> {
        Ok(self.transactions.get(&hash).cloned())
    }

    async fn call(&self, request: &CallRequest, _block: BlockId) -> GuardResult<Bytes> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        self.call_result.clone().map_err(GuardError::Provider)
    }

    async fn get_balance(&self, address: Address) -> GuardResult<U256> {
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    async fn get_code(&self, address: Address) -> GuardResult<Bytes> {
        Ok(self.code.get(&address).cloned().unwrap_or_default())
    }

    async fn estimate_gas(&self, _request: &CallRequest) -> GuardResult<u64> {
        self.gas_estimate.clone().map_err(GuardError::Provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_hash_is_none() {
        let chain = MockChain::builder().build();
        assert!(chain
            .get_transaction_by_hash(B256::ZERO)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn call_is_recorded() {
        let chain = MockChain::builder()
            .with_call_result(Bytes::from_static(&[1]))
            .build();
        let req = CallRequest {
            to: Some(Address::ZERO),
            ..CallRequest::default()
        };
        let out = chain.call(&req, BlockId::latest()).await.unwrap();
        assert_eq!(out.as_ref(), &[1]);
        assert_eq!(chain.recorded_calls(), vec![req]);
    }
}
