use crate::kind::TokenKind;
use crate::scheduler::CHUNK_SIZE;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub json_rpc_urls: Vec<String>,
    pub token_list_contract_address: Address,
    pub token_category: TokenKind,
    pub database_url: String,
    pub chunk_size: u64,
    pub sync_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let json_rpc_urls = parse_url_list(
            &std::env::var("JSON_RPC_URLS").context("JSON_RPC_URLS must be set in .env")?,
        );

        let contract_address_str = std::env::var("TOKEN_LIST_CONTRACT_ADDRESS")
            .context("TOKEN_LIST_CONTRACT_ADDRESS must be set in .env")?;

        let token_list_contract_address = Address::from_str(&contract_address_str)
            .context("Invalid TOKEN_LIST_CONTRACT_ADDRESS format")?;

        let token_category = match std::env::var("TOKEN_CATEGORY") {
            Ok(category) => TokenKind::from_str(&category).map_err(anyhow::Error::msg)?,
            Err(_) => TokenKind::StraightBond,
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./positions.db".to_string());

        let chunk_size = match std::env::var("SYNC_CHUNK_SIZE") {
            Ok(value) => value
                .parse()
                .context("SYNC_CHUNK_SIZE must be a positive integer")?,
            Err(_) => CHUNK_SIZE,
        };
        if chunk_size == 0 {
            anyhow::bail!("SYNC_CHUNK_SIZE must be a positive integer");
        }

        let sync_interval = match std::env::var("SYNC_INTERVAL_SECS") {
            Ok(value) => Duration::from_secs(
                value
                    .parse()
                    .context("SYNC_INTERVAL_SECS must be a number of seconds")?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
        };

        Ok(Config {
            json_rpc_urls,
            token_list_contract_address,
            token_category,
            database_url,
            chunk_size,
            sync_interval,
        })
    }
}

fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}
