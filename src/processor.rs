use crate::checkpoint::commit_chunk;
use crate::dedup::{reduce, reduce_locks};
use crate::error::Result;
use crate::events::{DecodedEvent, EventClass, EventKind, Role};
use crate::fetcher::{fetch_exchange_class, fetch_token_class};
use crate::kind::{Fields, TokenKind};
use crate::ledger::Ledger;
use crate::registry::{Registry, TargetToken};
use crate::repository::{Database, LockEvent, LockHistory};
use crate::resolver::BalanceResolver;
use crate::scheduler::{CHUNK_SIZE, windows};
use crate::sink::ChunkWrites;
use alloy_primitives::Address;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info};

const EXCHANGE_CLASSES: [EventClass; 3] = [EventClass::Exchange, EventClass::Escrow, EventClass::Dvp];

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Token list contract used to resolve listed tokens.
    pub token_list: Address,
    /// Only tokens of this template are indexed by this instance.
    pub category: TokenKind,
    pub chunk_size: u64,
}

impl ProcessorConfig {
    pub fn new(token_list: Address, category: TokenKind) -> Self {
        Self {
            token_list,
            category,
            chunk_size: CHUNK_SIZE,
        }
    }
}

/// What one sync cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSummary {
    pub head: u64,
    pub chunks: usize,
    pub positions_written: usize,
}

/// Drives sync cycles for one token category.
pub struct Processor<L> {
    ledger: L,
    db: Database,
    config: ProcessorConfig,
}

impl<L: Ledger> Processor<L> {
    pub fn new(ledger: L, db: Database, config: ProcessorConfig) -> Self {
        Processor { ledger, db, config }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn initial_sync(&mut self) -> Result<SyncSummary> {
        info!("Starting initial sync for {}", self.config.category);
        let summary = self.sync().await?;
        info!(
            "Initial sync completed at block {}: {} chunk(s), {} position write(s)",
            summary.head, summary.chunks, summary.positions_written
        );
        Ok(summary)
    }

    pub async fn sync_new_logs(&mut self) -> Result<SyncSummary> {
        let summary = self.sync().await?;
        debug!(
            "Synced to block {}: {} chunk(s), {} position write(s)",
            summary.head, summary.chunks, summary.positions_written
        );
        Ok(summary)
    }

    /// One cycle: rebuild targets, then walk every window up to the head.
    /// A failing chunk is rolled back and ends the cycle.
    async fn sync(&mut self) -> Result<SyncSummary> {
        let head = self.ledger.block_number().await?;
        let mut registry = Registry::build(
            &self.ledger,
            &self.db.conn,
            self.config.token_list,
            self.config.category,
        )
        .await?;

        let mut summary = SyncSummary {
            head,
            ..Default::default()
        };
        let Some(lowest) = registry.lowest_cursor(head) else {
            debug!("No listed {} tokens, nothing to sync", self.config.category);
            return Ok(summary);
        };

        for (from, to) in windows(lowest, head, self.config.chunk_size) {
            let started = Instant::now();
            let written = self.sync_chunk(&mut registry, to).await?;

            info!(
                "Processed blocks {} to {} in {:?} ({} position write(s))",
                from,
                to,
                started.elapsed(),
                written
            );
            summary.chunks += 1;
            summary.positions_written += written;
        }

        Ok(summary)
    }

    async fn sync_chunk(&mut self, registry: &mut Registry, to: u64) -> Result<usize> {
        let mut writes = ChunkWrites::new();

        self.sync_token_class(registry, to, &mut writes).await?;
        for class in EXCHANGE_CLASSES {
            self.sync_exchange_class(registry, class, to, &mut writes).await?;
        }

        commit_chunk(&mut self.db, &writes, registry, to)
    }

    async fn sync_token_class(
        &self,
        registry: &Registry,
        to: u64,
        writes: &mut ChunkWrites,
    ) -> Result<()> {
        let resolver = BalanceResolver::new(&self.ledger);

        for token in registry.tokens() {
            if token.cursor > to {
                continue;
            }

            let events = fetch_token_class(&self.ledger, token, to).await?;
            if events.is_empty() {
                continue;
            }

            let fields = token.kind.token_fields();
            let depositors = exchange_counterparties(&events, token);
            for (token_address, account) in reduce(&events) {
                // Exchange custody is tracked through the exchange fields
                if account == token.exchange {
                    continue;
                }
                let fields = if depositors.contains(&account) {
                    fields.with_exchange()
                } else {
                    fields
                };
                let update = resolver.resolve_fields(token, account, fields).await?;
                writes.stage(token_address, account, update);
            }

            for (token_address, lock, account) in reduce_locks(&events) {
                let value = resolver.resolve_locked(token_address, lock, account).await?;
                writes.stage_locked(token_address, lock, account, value);
            }

            self.record_lock_history(&events, writes).await?;
        }

        Ok(())
    }

    /// Stages one history row per Lock and Unlock, with the sending account
    /// and the block time read from the ledger.
    async fn record_lock_history(
        &self,
        events: &[DecodedEvent],
        writes: &mut ChunkWrites,
    ) -> Result<()> {
        let mut timestamps: HashMap<u64, u64> = HashMap::new();

        for event in events {
            let Some(detail) = &event.lock_detail else {
                continue;
            };
            let (Some(lock), Some(account)) =
                (event.account(Role::Lock), event.account(Role::Account))
            else {
                continue;
            };

            let block_timestamp = match timestamps.get(&event.block_number) {
                Some(timestamp) => *timestamp,
                None => {
                    let timestamp = self.ledger.block_timestamp(event.block_number).await?;
                    timestamps.insert(event.block_number, timestamp);
                    timestamp
                }
            };
            let msg_sender = self.ledger.transaction_sender(event.transaction_hash).await?;

            writes.record_lock_event(LockHistory {
                event: if event.kind == EventKind::Unlock {
                    LockEvent::Unlock
                } else {
                    LockEvent::Lock
                },
                transaction_hash: event.transaction_hash,
                msg_sender,
                block_number: event.block_number,
                log_index: event.log_index,
                token_address: event.token,
                lock_address: lock,
                account_address: account,
                recipient_address: event.account(Role::Recipient),
                value: detail.value,
                data: detail.data.clone(),
                block_timestamp,
            });
        }

        Ok(())
    }

    async fn sync_exchange_class(
        &self,
        registry: &Registry,
        class: EventClass,
        to: u64,
        writes: &mut ChunkWrites,
    ) -> Result<()> {
        let resolver = BalanceResolver::new(&self.ledger);

        for exchange in registry.exchanges() {
            if exchange.cursor > to {
                continue;
            }

            let events = fetch_exchange_class(&self.ledger, exchange, class, registry, to).await?;
            for (token_address, account) in reduce(&events) {
                let Some(token) = registry.token(&token_address) else {
                    continue;
                };
                let update = resolver
                    .resolve_fields(token, account, Fields::EXCHANGE)
                    .await?;
                writes.stage(token_address, account, update);
            }
        }

        Ok(())
    }
}

/// Accounts that moved tokens into or out of the token's exchange. Their
/// exchange balance changed along with their balance.
fn exchange_counterparties(events: &[DecodedEvent], token: &TargetToken) -> HashSet<Address> {
    if token.exchange.is_zero() {
        return HashSet::new();
    }

    events
        .iter()
        .filter(|event| event.kind == EventKind::Transfer)
        .filter_map(|event| {
            let from = event.account(Role::From)?;
            let to = event.account(Role::To)?;
            if to == token.exchange {
                Some(from)
            } else if from == token.exchange {
                Some(to)
            } else {
                None
            }
        })
        .collect()
}
