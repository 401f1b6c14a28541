//! Pulls and decodes the logs of one chunk.

use crate::error::Result;
use crate::events::{DecodedEvent, EventClass, EventKind, decode_event};
use crate::ledger::Ledger;
use crate::registry::{Registry, TargetExchange, TargetToken};
use alloy::rpc::types::Log;
use tracing::{debug, warn};

/// Outcome of fetching one event kind from one contract.
#[derive(Debug, PartialEq, Eq)]
pub enum Fetched {
    /// The contract's template does not emit this kind.
    Unsupported,
    Events(Vec<DecodedEvent>),
}

fn decode_logs(kind: EventKind, logs: Vec<Log>) -> Vec<DecodedEvent> {
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        match decode_event(kind, &log) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(
                    "Failed to decode {:?} log at block {:?}: {}",
                    kind, log.block_number, e
                );
            }
        }
    }
    events
}

fn sort_events(events: &mut [DecodedEvent]) {
    events.sort_by_key(|e| (e.block_number, e.log_index));
}

/// Fetches `kind` from `token` over `[token.cursor, to]`.
pub async fn fetch_token_events<L: Ledger + ?Sized>(
    ledger: &L,
    token: &TargetToken,
    kind: EventKind,
    to: u64,
) -> Result<Fetched> {
    if !token.kind.supports(kind) {
        return Ok(Fetched::Unsupported);
    }

    let logs = ledger
        .logs(token.address, kind.topic0(), token.cursor, to)
        .await?;
    Ok(Fetched::Events(decode_logs(kind, logs)))
}

/// Every token-emitted event of `token` in the chunk, in chain order.
pub async fn fetch_token_class<L: Ledger + ?Sized>(
    ledger: &L,
    token: &TargetToken,
    to: u64,
) -> Result<Vec<DecodedEvent>> {
    let mut events = Vec::new();
    for kind in EventClass::Token.kinds() {
        match fetch_token_events(ledger, token, *kind, to).await? {
            Fetched::Unsupported => {}
            Fetched::Events(batch) => events.extend(batch),
        }
    }
    sort_events(&mut events);
    Ok(events)
}

/// Events of `class` emitted by `exchange` in the chunk, in chain order.
///
/// An event is discarded when the token it names is not tracked, or when its
/// block precedes that token's cursor: the token's state for that block has
/// already been reconciled.
pub async fn fetch_exchange_class<L: Ledger + ?Sized>(
    ledger: &L,
    exchange: &TargetExchange,
    class: EventClass,
    registry: &Registry,
    to: u64,
) -> Result<Vec<DecodedEvent>> {
    let mut events = Vec::new();
    for kind in class.kinds() {
        let logs = ledger
            .logs(exchange.address, kind.topic0(), exchange.cursor, to)
            .await?;

        for event in decode_logs(*kind, logs) {
            match registry.get_cursor(&event.token) {
                Some(cursor) if event.block_number >= cursor => events.push(event),
                Some(_) => {}
                None => {
                    debug!(
                        "Skipping {:?} for untracked token {:?}",
                        event.kind, event.token
                    );
                }
            }
        }
    }
    sort_events(&mut events);
    Ok(events)
}
