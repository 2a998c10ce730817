use async_trait::async_trait;
use tracker_core::types::User;
use tracker_core::Result;

/// Read-only source of `(username, address)` pairs
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Load every registered user. Errors are `TrackerError::Registry`.
    async fn load_users(&self) -> Result<Vec<User>>;
}
