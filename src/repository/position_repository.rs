use super::models::{LockedPosition, Position, PositionStats, PositionUpdate};
use crate::error::Result;
use alloy_primitives::{Address, U256};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::str::FromStr;
use tracing::debug;

pub struct PositionRepository<'a> {
    conn: &'a Connection,
}

/// Pad a U256 amount to 78 digits so that text order matches numeric order.
/// U256 max is approximately 1.16 * 10^77, so 78 digits is sufficient.
pub fn pad_amount(amount: &U256) -> String {
    format!("{amount:0>78}")
}

pub(crate) fn column_address(row: &Row, idx: usize) -> rusqlite::Result<Address> {
    Address::from_str(&row.get::<_, String>(idx)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn column_amount(row: &Row, idx: usize) -> rusqlite::Result<U256> {
    parse_padded(&row.get::<_, String>(idx)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_padded(padded: &str) -> std::result::Result<U256, <U256 as FromStr>::Err> {
    let trimmed = padded.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok(U256::ZERO)
    } else {
        U256::from_str(trimmed)
    }
}

impl<'a> PositionRepository<'a> {
    const SELECT_POSITION: &'static str = "SELECT token_address, account_address, balance, \
         exchange_balance, exchange_commitment, pending_transfer FROM position";

    const INSERT_POSITION: &'static str = "INSERT INTO position (token_address, account_address, \
         balance, exchange_balance, exchange_commitment, pending_transfer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    // NULL parameters keep the stored value
    const UPDATE_POSITION: &'static str = "UPDATE position SET
         balance = COALESCE(?3, balance),
         exchange_balance = COALESCE(?4, exchange_balance),
         exchange_commitment = COALESCE(?5, exchange_commitment),
         pending_transfer = COALESCE(?6, pending_transfer)
         WHERE token_address = ?1 AND account_address = ?2";

    const SELECT_LOCKED: &'static str =
        "SELECT token_address, lock_address, account_address, value FROM locked_position";

    const INSERT_LOCKED: &'static str = "INSERT INTO locked_position \
         (token_address, lock_address, account_address, value) VALUES (?1, ?2, ?3, ?4)";

    const UPDATE_LOCKED: &'static str = "UPDATE locked_position SET value = ?4
         WHERE token_address = ?1 AND lock_address = ?2 AND account_address = ?3";

    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, token: &Address, account: &Address) -> Result<Option<Position>> {
        let query = format!(
            "{} WHERE token_address = ?1 AND account_address = ?2",
            Self::SELECT_POSITION
        );
        let position = self
            .conn
            .query_row(
                &query,
                params![format!("{token:?}"), format!("{account:?}")],
                Self::row_to_position,
            )
            .optional()?;
        Ok(position)
    }

    /// Writes the supplied fields of `update`.
    ///
    /// An existing row has exactly those fields overwritten. A missing row is
    /// only created when some supplied value is positive; omitted amounts are
    /// stored as zero and an omitted `pending_transfer` stays NULL.
    /// Returns whether a row was written.
    pub fn apply(&self, token: &Address, account: &Address, update: &PositionUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let token_str = format!("{token:?}");
        let account_str = format!("{account:?}");
        let pad = |v: Option<U256>| v.as_ref().map(pad_amount);

        let updated = self.conn.execute(
            Self::UPDATE_POSITION,
            params![
                token_str,
                account_str,
                pad(update.balance),
                pad(update.exchange_balance),
                pad(update.exchange_commitment),
                pad(update.pending_transfer),
            ],
        )?;
        if updated > 0 {
            debug!("Updated position {:?}/{:?}: {:?}", token, account, update);
            return Ok(true);
        }

        if !update.has_positive() {
            return Ok(false);
        }

        let zero = pad_amount(&U256::ZERO);
        self.conn.execute(
            Self::INSERT_POSITION,
            params![
                token_str,
                account_str,
                pad(update.balance).unwrap_or_else(|| zero.clone()),
                pad(update.exchange_balance).unwrap_or_else(|| zero.clone()),
                pad(update.exchange_commitment).unwrap_or(zero),
                pad(update.pending_transfer),
            ],
        )?;
        debug!("Created position {:?}/{:?}: {:?}", token, account, update);
        Ok(true)
    }

    /// Positions in `token`, largest balance first.
    pub fn list_by_token(&self, token: &Address) -> Result<Vec<Position>> {
        let query = format!(
            "{} WHERE token_address = ?1 ORDER BY balance DESC, account_address",
            Self::SELECT_POSITION
        );
        let mut stmt = self.conn.prepare(&query)?;
        let positions = stmt
            .query_map(params![format!("{token:?}")], Self::row_to_position)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(positions)
    }

    pub fn list_by_account(&self, account: &Address) -> Result<Vec<Position>> {
        let query = format!(
            "{} WHERE account_address = ?1 ORDER BY token_address",
            Self::SELECT_POSITION
        );
        let mut stmt = self.conn.prepare(&query)?;
        let positions = stmt
            .query_map(params![format!("{account:?}")], Self::row_to_position)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(positions)
    }

    pub fn get_locked(
        &self,
        token: &Address,
        lock: &Address,
        account: &Address,
    ) -> Result<Option<LockedPosition>> {
        let query = format!(
            "{} WHERE token_address = ?1 AND lock_address = ?2 AND account_address = ?3",
            Self::SELECT_LOCKED
        );
        let locked = self
            .conn
            .query_row(
                &query,
                params![
                    format!("{token:?}"),
                    format!("{lock:?}"),
                    format!("{account:?}")
                ],
                Self::row_to_locked,
            )
            .optional()?;
        Ok(locked)
    }

    /// Same rules as [`apply`](Self::apply) for a single locked amount.
    pub fn apply_locked(
        &self,
        token: &Address,
        lock: &Address,
        account: &Address,
        value: &U256,
    ) -> Result<bool> {
        let keys = (
            format!("{token:?}"),
            format!("{lock:?}"),
            format!("{account:?}"),
        );
        let padded = pad_amount(value);

        let updated = self.conn.execute(
            Self::UPDATE_LOCKED,
            params![keys.0, keys.1, keys.2, padded],
        )?;
        if updated > 0 {
            return Ok(true);
        }
        if value.is_zero() {
            return Ok(false);
        }

        self.conn.execute(
            Self::INSERT_LOCKED,
            params![keys.0, keys.1, keys.2, padded],
        )?;
        debug!("Created locked position {:?}/{:?}/{:?}: {}", token, lock, account, value);
        Ok(true)
    }

    pub fn list_locked_by_account(&self, account: &Address) -> Result<Vec<LockedPosition>> {
        let query = format!(
            "{} WHERE account_address = ?1 ORDER BY token_address, lock_address",
            Self::SELECT_LOCKED
        );
        let mut stmt = self.conn.prepare(&query)?;
        let locked = stmt
            .query_map(params![format!("{account:?}")], Self::row_to_locked)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locked)
    }

    pub fn get_statistics(&self) -> Result<PositionStats> {
        let (positions, tokens, accounts): (usize, usize, usize) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT token_address), COUNT(DISTINCT account_address)
             FROM position",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let locked_positions: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM locked_position", [], |row| row.get(0))?;

        let (checkpoints, latest_block): (usize, Option<u64>) = self.conn.query_row(
            "SELECT COUNT(*), MAX(latest_block_number) FROM position_checkpoint",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(PositionStats {
            positions,
            tokens,
            accounts,
            locked_positions,
            checkpoints,
            latest_block,
        })
    }

    fn row_to_position(row: &Row) -> rusqlite::Result<Position> {
        let pending_transfer = match row.get::<_, Option<String>>(5)? {
            Some(padded) => Some(parse_padded(&padded).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
            })?),
            None => None,
        };

        Ok(Position {
            token_address: column_address(row, 0)?,
            account_address: column_address(row, 1)?,
            balance: column_amount(row, 2)?,
            exchange_balance: column_amount(row, 3)?,
            exchange_commitment: column_amount(row, 4)?,
            pending_transfer,
        })
    }

    fn row_to_locked(row: &Row) -> rusqlite::Result<LockedPosition> {
        Ok(LockedPosition {
            token_address: column_address(row, 0)?,
            lock_address: column_address(row, 1)?,
            account_address: column_address(row, 2)?,
            value: column_amount(row, 3)?,
        })
    }
}
