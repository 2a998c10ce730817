use std::sync::Arc;
use tokio::sync::RwLock;

use crate::directory::UserDirectory;
use crate::registry::UserRegistry;
use crate::tracker_state::TrackerState;

/// Shared in-memory state of the tracker
pub struct TrackerStore {
    pub directory: Arc<UserDirectory>,
    pub state: Arc<RwLock<TrackerState>>,
}

impl TrackerStore {
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self {
            directory: Arc::new(UserDirectory::new(registry)),
            state: Arc::new(RwLock::new(TrackerState::default())),
        }
    }
}
