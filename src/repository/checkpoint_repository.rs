use super::models::Checkpoint;
use super::position_repository::column_address;
use crate::error::Result;
use alloy_primitives::Address;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub struct CheckpointRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CheckpointRepository<'a> {
    const GET_LATEST_BLOCK: &'static str = "SELECT latest_block_number FROM position_checkpoint
         WHERE token_address = ?1 AND exchange_address = ?2";

    const UPSERT_CHECKPOINT: &'static str = "INSERT INTO position_checkpoint
         (token_address, exchange_address, latest_block_number) VALUES (?1, ?2, ?3)
         ON CONFLICT (token_address, exchange_address)
         DO UPDATE SET latest_block_number = excluded.latest_block_number";

    const SELECT_CHECKPOINTS: &'static str = "SELECT token_address, exchange_address, \
         latest_block_number FROM position_checkpoint ORDER BY token_address, exchange_address";

    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Last fully processed block for the `(token, exchange)` pair.
    pub fn get_latest_block(&self, token: &Address, exchange: &Address) -> Result<Option<u64>> {
        let block: Option<u64> = self
            .conn
            .query_row(
                Self::GET_LATEST_BLOCK,
                params![format!("{token:?}"), format!("{exchange:?}")],
                |row| row.get(0),
            )
            .optional()?;
        Ok(block)
    }

    pub fn upsert(&self, token: &Address, exchange: &Address, block_number: u64) -> Result<()> {
        self.conn.execute(
            Self::UPSERT_CHECKPOINT,
            params![format!("{token:?}"), format!("{exchange:?}"), block_number],
        )?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Checkpoint>> {
        let mut stmt = self.conn.prepare(Self::SELECT_CHECKPOINTS)?;
        let checkpoints = stmt
            .query_map([], Self::row_to_checkpoint)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(checkpoints)
    }

    fn row_to_checkpoint(row: &Row) -> rusqlite::Result<Checkpoint> {
        Ok(Checkpoint {
            token_address: column_address(row, 0)?,
            exchange_address: column_address(row, 1)?,
            latest_block_number: row.get(2)?,
        })
    }
}
