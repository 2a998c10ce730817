//! SQLite adapters: the read-only address registry and the tracker's own
//! last-checked-hash store.

mod checkpoint;
mod config;
mod error;
pub mod models;
mod pool;
mod registry;
pub mod repositories;

pub use checkpoint::SqlCheckpointStore;
pub use config::DatabaseConfig;
pub use error::{DatabaseError, Result};
pub use pool::DatabasePool;
pub use registry::SqlUserRegistry;
