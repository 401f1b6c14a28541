use alloy_primitives::{Address, B256, U256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub token_address: Address,
    pub is_public: bool,
    pub owner_address: Address,
}

/// Holdings of one account in one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub token_address: Address,
    pub account_address: Address,
    pub balance: U256,
    pub exchange_balance: U256,
    pub exchange_commitment: U256,
    pub pending_transfer: Option<U256>,
}

/// Partial position write. `None` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionUpdate {
    pub balance: Option<U256>,
    pub exchange_balance: Option<U256>,
    pub exchange_commitment: Option<U256>,
    pub pending_transfer: Option<U256>,
}

impl PositionUpdate {
    fn values(&self) -> [Option<U256>; 4] {
        [
            self.balance,
            self.exchange_balance,
            self.exchange_commitment,
            self.pending_transfer,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }

    /// Whether a missing row may be created from this update.
    pub fn has_positive(&self) -> bool {
        self.values().iter().flatten().any(|v| *v > U256::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPosition {
    pub token_address: Address,
    pub lock_address: Address,
    pub account_address: Address,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    Lock,
    Unlock,
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockEvent::Lock => write!(f, "Lock"),
            LockEvent::Unlock => write!(f, "Unlock"),
        }
    }
}

impl FromStr for LockEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lock" => Ok(LockEvent::Lock),
            "Unlock" => Ok(LockEvent::Unlock),
            other => Err(format!("unknown lock event: {other}")),
        }
    }
}

/// One Lock or Unlock as it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHistory {
    pub event: LockEvent,
    pub transaction_hash: B256,
    pub msg_sender: Address,
    pub block_number: u64,
    pub log_index: u64,
    pub token_address: Address,
    pub lock_address: Address,
    pub account_address: Address,
    /// Set for Unlock only.
    pub recipient_address: Option<Address>,
    pub value: U256,
    pub data: String,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub token_address: Address,
    pub exchange_address: Address,
    pub latest_block_number: u64,
}

#[derive(Debug)]
pub struct PositionStats {
    pub positions: usize,
    pub tokens: usize,
    pub accounts: usize,
    pub locked_positions: usize,
    pub checkpoints: usize,
    pub latest_block: Option<u64>,
}
