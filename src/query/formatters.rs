use crate::repository::{Checkpoint, LockHistory, LockedPosition, Position, PositionStats};
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

fn csv_output(wtr: Writer<Vec<u8>>) -> String {
    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}

fn pending_str(position: &Position) -> String {
    position
        .pending_transfer
        .map_or("-".to_string(), |v| v.to_string())
}

pub fn format_positions(positions: &[Position], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_positions_table(positions),
        OutputFormat::Json => format_positions_json(positions),
        OutputFormat::Csv => format_positions_csv(positions),
    }
}

fn format_positions_table(positions: &[Position]) -> String {
    if positions.is_empty() {
        return "No positions found.".to_string();
    }

    let mut table = new_table(vec![
        "Token",
        "Account",
        "Balance",
        "Exchange Balance",
        "Exchange Commitment",
        "Pending Transfer",
    ]);

    for position in positions {
        table.add_row(vec![
            Cell::new(format!("{:#}", position.token_address)),
            Cell::new(format!("{:#}", position.account_address)),
            Cell::new(position.balance.to_string()),
            Cell::new(position.exchange_balance.to_string()),
            Cell::new(position.exchange_commitment.to_string()),
            Cell::new(pending_str(position)),
        ]);
    }

    table.to_string()
}

fn format_positions_json(positions: &[Position]) -> String {
    let json_positions: Vec<_> = positions
        .iter()
        .map(|p| {
            json!({
                "token_address": format!("{:?}", p.token_address),
                "account_address": format!("{:?}", p.account_address),
                "balance": p.balance.to_string(),
                "exchange_balance": p.exchange_balance.to_string(),
                "exchange_commitment": p.exchange_commitment.to_string(),
                "pending_transfer": p.pending_transfer.map(|v| v.to_string()),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json_positions).unwrap_or_else(|_| "[]".to_string())
}

fn format_positions_csv(positions: &[Position]) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record([
        "token_address",
        "account_address",
        "balance",
        "exchange_balance",
        "exchange_commitment",
        "pending_transfer",
    ]);

    for position in positions {
        let _ = wtr.write_record([
            &format!("{:?}", position.token_address),
            &format!("{:?}", position.account_address),
            &position.balance.to_string(),
            &position.exchange_balance.to_string(),
            &position.exchange_commitment.to_string(),
            &position
                .pending_transfer
                .map_or(String::new(), |v| v.to_string()),
        ]);
    }

    csv_output(wtr)
}

pub fn format_locked(locked: &[LockedPosition], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if locked.is_empty() {
                return "No locked positions found.".to_string();
            }
            let mut table = new_table(vec!["Token", "Lock", "Account", "Value"]);
            for l in locked {
                table.add_row(vec![
                    Cell::new(format!("{:#}", l.token_address)),
                    Cell::new(format!("{:#}", l.lock_address)),
                    Cell::new(format!("{:#}", l.account_address)),
                    Cell::new(l.value.to_string()),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let json_locked: Vec<_> = locked
                .iter()
                .map(|l| {
                    json!({
                        "token_address": format!("{:?}", l.token_address),
                        "lock_address": format!("{:?}", l.lock_address),
                        "account_address": format!("{:?}", l.account_address),
                        "value": l.value.to_string(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&json_locked).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["token_address", "lock_address", "account_address", "value"]);
            for l in locked {
                let _ = wtr.write_record([
                    &format!("{:?}", l.token_address),
                    &format!("{:?}", l.lock_address),
                    &format!("{:?}", l.account_address),
                    &l.value.to_string(),
                ]);
            }
            csv_output(wtr)
        }
    }
}

pub fn format_lock_history(history: &[LockHistory], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if history.is_empty() {
                return "No lock events found.".to_string();
            }
            let mut table = new_table(vec![
                "Block", "Event", "Token", "Lock", "Account", "Recipient", "Value", "Sender",
            ]);
            for h in history {
                table.add_row(vec![
                    Cell::new(h.block_number),
                    Cell::new(h.event),
                    Cell::new(format!("{:#}", h.token_address)),
                    Cell::new(format!("{:#}", h.lock_address)),
                    Cell::new(format!("{:#}", h.account_address)),
                    Cell::new(
                        h.recipient_address
                            .map_or("-".to_string(), |a| format!("{a:#}")),
                    ),
                    Cell::new(h.value.to_string()),
                    Cell::new(format!("{:#}", h.msg_sender)),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let json_history: Vec<_> = history
                .iter()
                .map(|h| {
                    json!({
                        "event": h.event.to_string(),
                        "transaction_hash": format!("{:?}", h.transaction_hash),
                        "msg_sender": format!("{:?}", h.msg_sender),
                        "block_number": h.block_number,
                        "log_index": h.log_index,
                        "token_address": format!("{:?}", h.token_address),
                        "lock_address": format!("{:?}", h.lock_address),
                        "account_address": format!("{:?}", h.account_address),
                        "recipient_address": h.recipient_address.map(|a| format!("{a:?}")),
                        "value": h.value.to_string(),
                        "data": h.data,
                        "block_timestamp": h.block_timestamp,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&json_history).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record([
                "block_number",
                "log_index",
                "event",
                "transaction_hash",
                "msg_sender",
                "token_address",
                "lock_address",
                "account_address",
                "recipient_address",
                "value",
                "data",
                "block_timestamp",
            ]);
            for h in history {
                let _ = wtr.write_record([
                    &h.block_number.to_string(),
                    &h.log_index.to_string(),
                    &h.event.to_string(),
                    &format!("{:?}", h.transaction_hash),
                    &format!("{:?}", h.msg_sender),
                    &format!("{:?}", h.token_address),
                    &format!("{:?}", h.lock_address),
                    &format!("{:?}", h.account_address),
                    &h.recipient_address
                        .map_or(String::new(), |a| format!("{a:?}")),
                    &h.value.to_string(),
                    &h.data,
                    &h.block_timestamp.to_string(),
                ]);
            }
            csv_output(wtr)
        }
    }
}

pub fn format_checkpoints(checkpoints: &[Checkpoint], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if checkpoints.is_empty() {
                return "No checkpoints found.".to_string();
            }
            let mut table = new_table(vec!["Token", "Exchange", "Latest Block"]);
            for checkpoint in checkpoints {
                table.add_row(vec![
                    Cell::new(format!("{:#}", checkpoint.token_address)),
                    Cell::new(format!("{:#}", checkpoint.exchange_address)),
                    Cell::new(checkpoint.latest_block_number),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            let json_checkpoints: Vec<_> = checkpoints
                .iter()
                .map(|c| {
                    json!({
                        "token_address": format!("{:?}", c.token_address),
                        "exchange_address": format!("{:?}", c.exchange_address),
                        "latest_block_number": c.latest_block_number,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&json_checkpoints).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["token_address", "exchange_address", "latest_block_number"]);
            for c in checkpoints {
                let _ = wtr.write_record([
                    &format!("{:?}", c.token_address),
                    &format!("{:?}", c.exchange_address),
                    &c.latest_block_number.to_string(),
                ]);
            }
            csv_output(wtr)
        }
    }
}

pub fn format_stats(stats: &PositionStats, format: &OutputFormat) -> String {
    let latest_block = stats
        .latest_block
        .map_or("N/A".to_string(), |b| b.to_string());
    let rows = [
        ("positions", stats.positions.to_string()),
        ("tokens", stats.tokens.to_string()),
        ("accounts", stats.accounts.to_string()),
        ("locked_positions", stats.locked_positions.to_string()),
        ("checkpoints", stats.checkpoints.to_string()),
        ("latest_block", latest_block),
    ];

    match format {
        OutputFormat::Table => {
            let mut table = new_table(vec!["Metric", "Value"]);
            for (metric, value) in &rows {
                table.add_row(vec![Cell::new(metric), Cell::new(value)]);
            }
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "positions": stats.positions,
            "tokens": stats.tokens,
            "accounts": stats.accounts,
            "locked_positions": stats.locked_positions,
            "checkpoints": stats.checkpoints,
            "latest_block": stats.latest_block,
        }))
        .unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["metric", "value"]);
            for (metric, value) in &rows {
                let _ = wtr.write_record([*metric, value.as_str()]);
            }
            csv_output(wtr)
        }
    }
}
