use async_trait::async_trait;
use tracing::info;
use tracker_core::types::RewardMatchEvent;
use tracker_core::Result;

use super::NotificationDispatcher;
use crate::message::MessageTemplate;

/// Writes notifications to the log instead of a chat
pub struct LogDispatcher {
    template: MessageTemplate,
}

impl LogDispatcher {
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, event: &RewardMatchEvent) -> Result<()> {
        info!(
            username = %event.username,
            address = %event.address,
            reward = %event.reward,
            block = %event.block_hash,
            link = %self.template.block_link(event),
            "Reward notification (log only)"
        );
        Ok(())
    }
}
