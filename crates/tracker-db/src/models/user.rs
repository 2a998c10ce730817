use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracker_core::types::User;

/// Database model for the registry's users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    /// Display name
    pub username: String,
    /// Reward address (unique)
    pub address: String,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            username: row.username,
            address: row.address,
        }
    }
}
