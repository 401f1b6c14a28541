//! The ledger seam: everything the engine needs from a node.

use crate::error::LedgerError;
use alloy::rpc::types::Log;
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use tracing::debug;

/// Read-only access to an EVM node.
///
/// `RpcClient` is the production implementation; tests plug in an in-memory
/// ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current chain head.
    async fn block_number(&self) -> Result<u64, LedgerError>;

    /// Logs emitted by `address` with first topic `topic0` in `[from_block, to_block]`.
    async fn logs(
        &self,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, LedgerError>;

    /// `eth_call` against the latest state.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, LedgerError>;

    /// Unix timestamp of block `block_number`.
    async fn block_timestamp(&self, block_number: u64) -> Result<u64, LedgerError>;

    /// Account that sent transaction `hash`.
    async fn transaction_sender(&self, hash: B256) -> Result<Address, LedgerError>;
}

/// Executes a typed contract call, falling back to `default` when the call
/// reverts or returns data that does not decode. Transport failures propagate.
pub async fn call_or_default<L, C>(
    ledger: &L,
    to: Address,
    call: C,
    default: C::Return,
) -> Result<C::Return, LedgerError>
where
    L: Ledger + ?Sized,
    C: SolCall,
{
    match ledger.call(to, call.abi_encode().into()).await {
        Ok(output) => match C::abi_decode_returns(&output) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("{} on {:?} returned undecodable data: {}", C::SIGNATURE, to, e);
                Ok(default)
            }
        },
        Err(LedgerError::CallFailed(msg)) => {
            debug!("{} on {:?} failed, using default: {}", C::SIGNATURE, to, msg);
            Ok(default)
        }
        Err(e) => Err(e),
    }
}
