// ABOUTME: Local repository contract and persistence for Tracksync
// ABOUTME: SQLite system of record plus an in-memory implementation

pub mod error;
pub mod memory;
pub mod repository;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryRepository;
pub use repository::SyncRepository;
pub use sqlite::{SqliteRepository, StorageConfig};
