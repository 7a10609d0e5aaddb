//! Chain access abstraction and static reference data for txguard.

pub mod labels;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod registry;
pub mod rpc;

use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use txguard_core::error::GuardResult;
use txguard_core::{CallRequest, Transaction};

pub use registry::ReferenceSets;

/// Read access to chain state.
///
/// Every method may fail; callers decide whether a failure aborts the
/// analysis (hash lookup) or degrades it (simulation). Implementations do
/// not retry.
#[async_trait]
pub trait ChainAccess: Send + Sync {
    /// `Ok(None)` when the node does not know the hash.
    async fn get_transaction_by_hash(&self, hash: B256) -> GuardResult<Option<Transaction>>;

    /// `eth_call` against `block`. Returns raw return data.
    async fn call(&self, request: &CallRequest, block: BlockId) -> GuardResult<Bytes>;

    async fn get_balance(&self, address: Address) -> GuardResult<U256>;

    async fn get_code(&self, address: Address) -> GuardResult<Bytes>;

    async fn estimate_gas(&self, request: &CallRequest) -> GuardResult<u64>;
}
