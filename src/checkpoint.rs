//! Per-chunk commit: staged positions plus checkpoint advance, atomically.

use crate::error::Result;
use crate::registry::Registry;
use crate::repository::{CheckpointRepository, Database};
use crate::sink::ChunkWrites;
use rusqlite::Connection;
use tracing::debug;

/// Records `block_number` as processed for every token target that has
/// started by then.
pub fn advance(conn: &Connection, registry: &Registry, block_number: u64) -> Result<usize> {
    let repo = CheckpointRepository::new(conn);
    let mut advanced = 0;

    for token in registry.tokens() {
        if token.start_block > block_number {
            continue;
        }
        repo.upsert(&token.address, &token.exchange, block_number)?;
        advanced += 1;
    }

    Ok(advanced)
}

/// Applies `writes` and advances checkpoints to `block_number` in a single
/// transaction, then moves the in-memory cursors. Nothing is persisted and no
/// cursor moves if any statement fails.
pub fn commit_chunk(
    db: &mut Database,
    writes: &ChunkWrites,
    registry: &mut Registry,
    block_number: u64,
) -> Result<usize> {
    let tx = db.conn.transaction()?;
    let written = writes.apply(&tx)?;
    let advanced = advance(&tx, registry, block_number)?;
    tx.commit()?;

    registry.advance_cursors(block_number);
    debug!(
        "Committed chunk at block {}: {} position write(s), {} checkpoint(s)",
        block_number, written, advanced
    );
    Ok(written)
}
