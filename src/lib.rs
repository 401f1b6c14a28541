pub mod checkpoint;
pub mod config;
pub mod contracts;
pub mod dedup;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod kind;
pub mod ledger;
pub mod processor;
pub mod query;
pub mod registry;
pub mod repository;
pub mod resolver;
pub mod rpc;
pub mod scheduler;
pub mod sink;

pub use error::{IndexerError, LedgerError};
pub use ledger::Ledger;
pub use processor::{Processor, ProcessorConfig, SyncSummary};
