use crate::query::formatters::{
    OutputFormat, format_checkpoints, format_lock_history, format_locked, format_positions,
    format_stats,
};
use crate::repository::{CheckpointRepository, LockHistoryRepository, PositionRepository};
use alloy_primitives::Address;
use anyhow::Result;
use std::str::FromStr;

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).map_err(|_| anyhow::anyhow!("Invalid address format: {}", address))
}

pub fn cmd_positions(repo: &PositionRepository, token: &str, format: &OutputFormat) -> Result<()> {
    let token = parse_address(token)?;

    let positions = repo.list_by_token(&token)?;
    let output = format_positions(&positions, format);
    println!("{output}");

    Ok(())
}

pub fn cmd_account(repo: &PositionRepository, account: &str, format: &OutputFormat) -> Result<()> {
    let account = parse_address(account)?;

    let positions = repo.list_by_account(&account)?;
    println!("{}", format_positions(&positions, format));

    let locked = repo.list_locked_by_account(&account)?;
    if !locked.is_empty() {
        println!("{}", format_locked(&locked, format));
    }

    Ok(())
}

pub fn cmd_locks(
    repo: &LockHistoryRepository,
    token: Option<&str>,
    account: Option<&str>,
    limit: usize,
    format: &OutputFormat,
) -> Result<()> {
    let token = token.map(parse_address).transpose()?;
    let account = account.map(parse_address).transpose()?;

    let history = repo.list(token.as_ref(), account.as_ref(), limit)?;
    println!("{}", format_lock_history(&history, format));

    Ok(())
}

pub fn cmd_checkpoints(repo: &CheckpointRepository, format: &OutputFormat) -> Result<()> {
    let checkpoints = repo.list()?;
    let output = format_checkpoints(&checkpoints, format);
    println!("{output}");

    Ok(())
}

pub fn cmd_stats(repo: &PositionRepository, format: &OutputFormat) -> Result<()> {
    let stats = repo.get_statistics()?;
    let output = format_stats(&stats, format);
    println!("{output}");

    Ok(())
}
