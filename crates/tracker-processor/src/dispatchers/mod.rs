mod log;
mod telegram;

pub use log::LogDispatcher;
pub use telegram::{TelegramDispatcher, TelegramNotifier};

use async_trait::async_trait;
use tracker_core::types::RewardMatchEvent;
use tracker_core::Result;

/// Delivers one reward notification per call.
///
/// Implementations make a single attempt and report failure as
/// `TrackerError::Dispatch`; retrying is the caller's concern.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: &RewardMatchEvent) -> Result<()>;
}
