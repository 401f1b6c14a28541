use anyhow::Result;
use clap::Parser;
use position_indexer::config::Config;
use position_indexer::kind::TokenKind;
use position_indexer::repository::Database;
use position_indexer::rpc::RpcClient;
use position_indexer::{IndexerError, Processor, ProcessorConfig};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Mirror token positions from on-chain events", long_about = None)]
struct Cli {
    /// Token category to index: bond, share, membership or coupon
    #[arg(long)]
    category: Option<TokenKind>,

    /// Seconds to wait between sync cycles
    #[arg(long)]
    interval: Option<u64>,
}

fn report(stage: &str, err: &IndexerError) {
    match err {
        IndexerError::Unavailable(msg) => warn!("{}: ledger node unavailable: {}", stage, msg),
        IndexerError::Database(e) => error!("{}: database error: {}", stage, e),
        other => error!("{}: unexpected error: {:?}", stage, other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("Starting position indexer");

    let mut config = Config::from_env()?;
    if let Some(category) = cli.category {
        config.token_category = category;
    }
    if let Some(secs) = cli.interval {
        config.sync_interval = Duration::from_secs(secs);
    }
    info!("Configuration loaded");
    info!("Token category: {}", config.token_category);
    info!("Token list: {:?}", config.token_list_contract_address);
    info!(
        "RPC URLs: {} endpoint(s) configured",
        config.json_rpc_urls.len()
    );

    let db = Database::new(&config.database_url)?;
    info!("Database initialized");

    let client = RpcClient::new(&config.json_rpc_urls)?;
    info!("RPC client connected");

    let mut processor = Processor::new(
        client,
        db,
        ProcessorConfig {
            token_list: config.token_list_contract_address,
            category: config.token_category,
            chunk_size: config.chunk_size,
        },
    );

    loop {
        match processor.initial_sync().await {
            Ok(_) => break,
            Err(e) => report("Initial sync", &e),
        }
        sleep(config.sync_interval).await;
    }

    loop {
        sleep(config.sync_interval).await;
        if let Err(e) = processor.sync_new_logs().await {
            report("Sync", &e);
        }
    }
}
