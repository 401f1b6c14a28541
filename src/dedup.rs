//! Collapses the accounts touched by a batch of events into one lookup each.

use crate::events::{DecodedEvent, Role};
use alloy_primitives::Address;
use std::collections::HashSet;

/// Distinct `(token, account)` pairs touched by `events`.
///
/// Events are walked newest first and each pair is kept the first time it is
/// seen; the result is then reversed, so it is deterministic for a given
/// batch. Zero addresses (mint and burn counterparties) are dropped.
pub fn reduce(events: &[DecodedEvent]) -> Vec<(Address, Address)> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for event in events.iter().rev() {
        for role in event.kind.touched_roles() {
            let Some(account) = event.account(*role) else {
                continue;
            };
            if account.is_zero() {
                continue;
            }
            if seen.insert((event.token, account)) {
                pairs.push((event.token, account));
            }
        }
    }

    pairs.reverse();
    pairs
}

/// Distinct `(token, lock, account)` triples moved by Lock/Unlock events.
pub fn reduce_locks(events: &[DecodedEvent]) -> Vec<(Address, Address, Address)> {
    let mut seen = HashSet::new();
    let mut triples = Vec::new();

    for event in events.iter().rev() {
        if !event.kind.moves_locked_balance() {
            continue;
        }
        let (Some(lock), Some(account)) = (event.account(Role::Lock), event.account(Role::Account))
        else {
            continue;
        };
        if lock.is_zero() || account.is_zero() {
            continue;
        }
        if seen.insert((event.token, lock, account)) {
            triples.push((event.token, lock, account));
        }
    }

    triples.reverse();
    triples
}
