use anyhow::{Context, Result};
use rusqlite::Connection;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let db_path = db_path.strip_prefix("sqlite:").unwrap_or(db_path);
        let conn = Connection::open(db_path).context("Failed to open database")?;

        let db = Database { conn };
        db.create_tables()?;
        Ok(db)
    }

    /// Fresh schema in a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        let db = Database { conn };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        // Owned by the listing service; created here so a fresh database works
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS listing (
                token_address TEXT PRIMARY KEY,
                is_public INTEGER NOT NULL DEFAULT 1,
                owner_address TEXT NOT NULL
            )",
            [],
        )?;

        // Amounts are 78-digit zero-padded decimals so text order is numeric order
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS position (
                token_address TEXT NOT NULL,
                account_address TEXT NOT NULL,
                balance TEXT NOT NULL,
                exchange_balance TEXT NOT NULL,
                exchange_commitment TEXT NOT NULL,
                pending_transfer TEXT,
                PRIMARY KEY (token_address, account_address)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS locked_position (
                token_address TEXT NOT NULL,
                lock_address TEXT NOT NULL,
                account_address TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (token_address, lock_address, account_address)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS lock_history (
                block_number INTEGER NOT NULL,
                log_index INTEGER NOT NULL,
                event TEXT NOT NULL,
                transaction_hash TEXT NOT NULL,
                msg_sender TEXT NOT NULL,
                token_address TEXT NOT NULL,
                lock_address TEXT NOT NULL,
                account_address TEXT NOT NULL,
                recipient_address TEXT,
                value TEXT NOT NULL,
                data TEXT NOT NULL,
                block_timestamp INTEGER NOT NULL,
                PRIMARY KEY (block_number, log_index)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS position_checkpoint (
                token_address TEXT NOT NULL,
                exchange_address TEXT NOT NULL,
                latest_block_number INTEGER NOT NULL,
                PRIMARY KEY (token_address, exchange_address)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_position_account
             ON position(account_address)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_lock_history_account
             ON lock_history(account_address)",
            [],
        )?;

        Ok(())
    }
}
