pub mod checkpoint_repository;
pub mod database;
pub mod listing_repository;
pub mod lock_history_repository;
pub mod models;
pub mod position_repository;

pub use checkpoint_repository::CheckpointRepository;
pub use database::Database;
pub use listing_repository::ListingRepository;
pub use lock_history_repository::LockHistoryRepository;
pub use models::{
    Checkpoint, Listing, LockEvent, LockHistory, LockedPosition, Position, PositionStats,
    PositionUpdate,
};
pub use position_repository::PositionRepository;
