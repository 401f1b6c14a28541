//! Which tokens and exchanges a sync cycle covers, and how far each has got.

use crate::contracts::{SecurityToken, TokenList};
use crate::error::Result;
use crate::kind::TokenKind;
use crate::ledger::{Ledger, call_or_default};
use crate::repository::{CheckpointRepository, ListingRepository};
use alloy_primitives::Address;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetToken {
    pub address: Address,
    pub kind: TokenKind,
    /// Declared tradable exchange, zero when the token has none.
    pub exchange: Address,
    pub start_block: u64,
    /// Next block to process.
    pub cursor: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetExchange {
    pub address: Address,
    pub start_block: u64,
    pub cursor: u64,
}

#[derive(Debug, Default)]
pub struct Registry {
    tokens: HashMap<Address, TargetToken>,
    exchanges: HashMap<Address, TargetExchange>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the targets for one `category` from the listing table.
    ///
    /// Each listed token is resolved through the token list contract; tokens
    /// of another template are ignored. A token resumes one block after its
    /// checkpoint, or from genesis when it has none.
    pub async fn build<L: Ledger + ?Sized>(
        ledger: &L,
        conn: &Connection,
        token_list: Address,
        category: TokenKind,
    ) -> Result<Self> {
        let listings = ListingRepository::new(conn).list()?;
        let checkpoints = CheckpointRepository::new(conn);
        let mut registry = Registry::new();

        for listing in listings {
            let token = listing.token_address;
            let info = call_or_default(
                ledger,
                token_list,
                TokenList::getTokenByAddressCall { _token: token },
                TokenList::getTokenByAddressReturn {
                    token_address: Address::ZERO,
                    token_template: String::new(),
                    owner_address: Address::ZERO,
                },
            )
            .await?;

            if TokenKind::from_template(&info.token_template) != Some(category) {
                continue;
            }

            let exchange = call_or_default(
                ledger,
                token,
                SecurityToken::tradableExchangeCall {},
                Address::ZERO,
            )
            .await?;

            let start_block = checkpoints
                .get_latest_block(&token, &exchange)?
                .map_or(0, |block| block + 1);

            registry.add_token(token, category, exchange, start_block);
        }

        debug!(
            "Registry built: {} token(s), {} exchange(s)",
            registry.tokens.len(),
            registry.exchanges.len()
        );
        Ok(registry)
    }

    /// Adds a token target. A token already present keeps the earlier start,
    /// and so does its exchange.
    pub fn add_token(
        &mut self,
        address: Address,
        kind: TokenKind,
        exchange: Address,
        start_block: u64,
    ) {
        self.tokens
            .entry(address)
            .and_modify(|target| {
                if start_block < target.start_block {
                    target.start_block = start_block;
                    target.cursor = start_block;
                }
            })
            .or_insert(TargetToken {
                address,
                kind,
                exchange,
                start_block,
                cursor: start_block,
            });

        if exchange.is_zero() {
            return;
        }
        self.exchanges
            .entry(exchange)
            .and_modify(|target| {
                if start_block < target.start_block {
                    target.start_block = start_block;
                    target.cursor = start_block;
                }
            })
            .or_insert(TargetExchange {
                address: exchange,
                start_block,
                cursor: start_block,
            });
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token targets in address order.
    pub fn tokens(&self) -> Vec<&TargetToken> {
        let mut tokens: Vec<_> = self.tokens.values().collect();
        tokens.sort_by_key(|t| t.address);
        tokens
    }

    /// Exchange targets in address order.
    pub fn exchanges(&self) -> Vec<&TargetExchange> {
        let mut exchanges: Vec<_> = self.exchanges.values().collect();
        exchanges.sort_by_key(|e| e.address);
        exchanges
    }

    pub fn token(&self, address: &Address) -> Option<&TargetToken> {
        self.tokens.get(address)
    }

    /// Cursor of a tracked token, `None` when the token is not tracked.
    pub fn get_cursor(&self, address: &Address) -> Option<u64> {
        self.tokens.get(address).map(|t| t.cursor)
    }

    /// The oldest cursor over all targets, capped at `head`.
    pub fn lowest_cursor(&self, head: u64) -> Option<u64> {
        self.tokens
            .values()
            .map(|t| t.cursor)
            .chain(self.exchanges.values().map(|e| e.cursor))
            .min()
            .map(|cursor| cursor.min(head))
    }

    /// Moves every target that has started by `block_number` past it.
    pub fn advance_cursors(&mut self, block_number: u64) {
        for target in self.tokens.values_mut() {
            if target.start_block <= block_number {
                target.cursor = target.cursor.max(block_number + 1);
            }
        }
        for target in self.exchanges.values_mut() {
            if target.start_block <= block_number {
                target.cursor = target.cursor.max(block_number + 1);
            }
        }
    }
}
