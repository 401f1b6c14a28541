use super::models::{LockEvent, LockHistory};
use super::position_repository::{column_address, column_amount, pad_amount};
use crate::error::Result;
use alloy_primitives::{Address, B256};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use std::str::FromStr;

pub struct LockHistoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LockHistoryRepository<'a> {
    // A replayed window hits the primary key and is ignored
    const INSERT_HISTORY: &'static str = "INSERT OR IGNORE INTO lock_history (
            block_number, log_index, event, transaction_hash, msg_sender, token_address,
            lock_address, account_address, recipient_address, value, data, block_timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

    const SELECT_HISTORY: &'static str = "SELECT block_number, log_index, event, \
         transaction_hash, msg_sender, token_address, lock_address, account_address, \
         recipient_address, value, data, block_timestamp FROM lock_history";

    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Records one Lock or Unlock. Returns false when it was already recorded.
    pub fn insert(&self, entry: &LockHistory) -> Result<bool> {
        let inserted = self.conn.execute(
            Self::INSERT_HISTORY,
            params![
                entry.block_number,
                entry.log_index,
                entry.event.to_string(),
                format!("{:?}", entry.transaction_hash),
                format!("{:?}", entry.msg_sender),
                format!("{:?}", entry.token_address),
                format!("{:?}", entry.lock_address),
                format!("{:?}", entry.account_address),
                entry.recipient_address.map(|a| format!("{a:?}")),
                pad_amount(&entry.value),
                entry.data,
                entry.block_timestamp,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Newest entries first, optionally narrowed to one token and/or account.
    pub fn list(
        &self,
        token: Option<&Address>,
        account: Option<&Address>,
        limit: usize,
    ) -> Result<Vec<LockHistory>> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(token) = token {
            conditions.push("token_address = ?");
            params.push(Box::new(format!("{token:?}")));
        }
        if let Some(account) = account {
            conditions.push("account_address = ?");
            params.push(Box::new(format!("{account:?}")));
        }

        let mut query = Self::SELECT_HISTORY.to_string();
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY block_number DESC, log_index DESC LIMIT ?");
        params.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&query)?;
        let history = stmt
            .query_map(params_from_iter(params.iter()), Self::row_to_history)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    pub fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM lock_history", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_history(row: &Row) -> rusqlite::Result<LockHistory> {
        let event = LockEvent::from_str(&row.get::<_, String>(2)?).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
        })?;
        let transaction_hash = B256::from_str(&row.get::<_, String>(3)?)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        let recipient_address = match row.get::<_, Option<String>>(8)? {
            Some(address) => Some(Address::from_str(&address).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e))
            })?),
            None => None,
        };

        Ok(LockHistory {
            event,
            transaction_hash,
            msg_sender: column_address(row, 4)?,
            block_number: row.get(0)?,
            log_index: row.get(1)?,
            token_address: column_address(row, 5)?,
            lock_address: column_address(row, 6)?,
            account_address: column_address(row, 7)?,
            recipient_address,
            value: column_amount(row, 9)?,
            data: row.get(10)?,
            block_timestamp: row.get(11)?,
        })
    }
}
