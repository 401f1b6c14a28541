//! Position writes staged for one chunk.

use crate::error::Result;
use crate::repository::{LockHistory, LockHistoryRepository, PositionRepository, PositionUpdate};
use alloy_primitives::{Address, U256};
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StagedPosition {
    token: Address,
    account: Address,
    update: PositionUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StagedLock {
    token: Address,
    lock: Address,
    account: Address,
    value: U256,
}

/// Writes collected while a chunk is processed, applied in staging order
/// inside the chunk's transaction.
#[derive(Debug, Default)]
pub struct ChunkWrites {
    positions: Vec<StagedPosition>,
    locks: Vec<StagedLock>,
    history: Vec<LockHistory>,
}

impl ChunkWrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, token: Address, account: Address, update: PositionUpdate) {
        if update.is_empty() {
            return;
        }
        self.positions.push(StagedPosition {
            token,
            account,
            update,
        });
    }

    pub fn stage_locked(&mut self, token: Address, lock: Address, account: Address, value: U256) {
        self.locks.push(StagedLock {
            token,
            lock,
            account,
            value,
        });
    }

    pub fn record_lock_event(&mut self, entry: LockHistory) {
        self.history.push(entry);
    }

    /// Staged position and locked-amount writes. History rows are not counted.
    pub fn len(&self) -> usize {
        self.positions.len() + self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.history.is_empty()
    }

    /// Applies every staged write and returns how many position rows were
    /// written.
    pub fn apply(&self, conn: &Connection) -> Result<usize> {
        let repo = PositionRepository::new(conn);
        let mut written = 0;

        for staged in &self.positions {
            if repo.apply(&staged.token, &staged.account, &staged.update)? {
                written += 1;
            }
        }
        for staged in &self.locks {
            if repo.apply_locked(&staged.token, &staged.lock, &staged.account, &staged.value)? {
                written += 1;
            }
        }

        let history = LockHistoryRepository::new(conn);
        for entry in &self.history {
            history.insert(entry)?;
        }

        Ok(written)
    }
}
