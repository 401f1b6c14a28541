use anyhow::Result;
use clap::{Parser, Subcommand};
use position_indexer::query::commands::{
    cmd_account, cmd_checkpoints, cmd_locks, cmd_positions, cmd_stats,
};
use position_indexer::query::formatters::OutputFormat;
use position_indexer::repository::{
    CheckpointRepository, Database, LockHistoryRepository, PositionRepository,
};

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Query indexed token positions", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Holders of a token, largest balance first
    Positions { token: String },
    /// Every position and lock of one account
    Account { address: String },
    /// Lock and Unlock history, newest first
    Locks {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        account: Option<String>,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    Checkpoints,
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());

    dotenv::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./positions.db".to_string());

    let db = Database::new(&database_url)?;
    let position_repo = PositionRepository::new(&db.conn);
    let checkpoint_repo = CheckpointRepository::new(&db.conn);
    let history_repo = LockHistoryRepository::new(&db.conn);

    match cli.command {
        Commands::Positions { token } => {
            cmd_positions(&position_repo, &token, &format)?;
        }
        Commands::Account { address } => {
            cmd_account(&position_repo, &address, &format)?;
        }
        Commands::Locks {
            token,
            account,
            limit,
        } => {
            cmd_locks(
                &history_repo,
                token.as_deref(),
                account.as_deref(),
                limit,
                &format,
            )?;
        }
        Commands::Checkpoints => {
            cmd_checkpoints(&checkpoint_repo, &format)?;
        }
        Commands::Stats => {
            cmd_stats(&position_repo, &format)?;
        }
    }

    Ok(())
}
