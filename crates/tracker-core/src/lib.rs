pub mod config;
pub mod error;
pub mod types;

pub use config::{DispatchConfig, NodeConfig, PollConfig, TelegramConfig, TrackerConfig};
pub use error::{Result, TrackerError};
