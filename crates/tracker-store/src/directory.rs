use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracker_core::types::User;
use tracker_core::Result;

use crate::registry::UserRegistry;

/// Immutable address -> username mapping
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    users: HashMap<String, String>,
}

impl DirectorySnapshot {
    /// Build a snapshot. Addresses are kept verbatim and must match output
    /// addresses exactly. Blank addresses are skipped; if the registry ever
    /// returns an address twice, the later row wins.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut map = HashMap::new();
        for user in users {
            let address = user.address;
            if address.trim().is_empty() {
                warn!(username = %user.username, "Skipping user without address");
                continue;
            }
            if let Some(previous) = map.insert(address.clone(), user.username) {
                warn!(address = %address, previous = %previous, "Duplicate address in registry");
            }
        }
        Self { users: map }
    }

    pub fn lookup(&self, address: &str) -> Option<&str> {
        self.users.get(address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Address directory loaded from the registry.
///
/// Every refresh builds a complete new snapshot before swapping it in, so
/// readers see either the old mapping or the new one, never a mix.
pub struct UserDirectory {
    registry: Arc<dyn UserRegistry>,
    snapshot: RwLock<Arc<DirectorySnapshot>>,
}

impl UserDirectory {
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self {
            registry,
            snapshot: RwLock::new(Arc::new(DirectorySnapshot::default())),
        }
    }

    /// Reload the whole mapping from the registry. On error the previous
    /// snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize> {
        let start = Instant::now();
        let users = self.registry.load_users().await?;
        let next = Arc::new(DirectorySnapshot::from_users(users));
        let count = next.len();

        *self.snapshot.write() = next;

        debug!(duration_us = start.elapsed().as_micros() as u64, "Directory swap complete");
        info!(users = count, "User directory reloaded from registry");
        Ok(count)
    }

    /// Current snapshot; cheap to clone and safe to hold across awaits
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        self.snapshot.read().clone()
    }

    pub fn lookup(&self, address: &str) -> Option<String> {
        self.snapshot.read().lookup(address).map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tracker_core::TrackerError;

    /// Registry whose rows can be edited between refreshes
    #[derive(Default)]
    struct FakeRegistry {
        users: Mutex<Vec<User>>,
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl UserRegistry for FakeRegistry {
        async fn load_users(&self) -> Result<Vec<User>> {
            if *self.fail.lock() {
                return Err(TrackerError::Registry("database is locked".to_string()));
            }
            Ok(self.users.lock().clone())
        }
    }

    #[test]
    fn test_snapshot_skips_empty_addresses() {
        let snapshot = DirectorySnapshot::from_users(vec![
            User::new("alice", "addr1"),
            User::new("ghost", "  "),
            User::new("bob", "addr2"),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.lookup("addr1"), Some("alice"));
        assert_eq!(snapshot.lookup(""), None);
    }

    #[test]
    fn test_addresses_match_exactly() {
        let snapshot = DirectorySnapshot::from_users(vec![User::new("alice", " addr1 ")]);
        assert_eq!(snapshot.lookup("addr1"), None);
        assert_eq!(snapshot.lookup(" addr1 "), Some("alice"));
    }

    #[tokio::test]
    async fn test_lookup_misses_until_refresh() {
        let registry = Arc::new(FakeRegistry::default());
        registry.users.lock().push(User::new("alice", "addr1"));

        let directory = UserDirectory::new(registry.clone());
        assert!(directory.is_empty());

        directory.refresh().await.unwrap();
        assert_eq!(directory.lookup("addr1").as_deref(), Some("alice"));

        // Added to the registry but not visible until the next refresh
        registry.users.lock().push(User::new("bob", "addr2"));
        assert_eq!(directory.lookup("addr2"), None);

        directory.refresh().await.unwrap();
        assert_eq!(directory.lookup("addr2").as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_refresh_replaces_instead_of_patching() {
        let registry = Arc::new(FakeRegistry::default());
        registry.users.lock().push(User::new("alice", "old-addr"));

        let directory = UserDirectory::new(registry.clone());
        directory.refresh().await.unwrap();

        *registry.users.lock() = vec![User::new("alice", "new-addr")];
        directory.refresh().await.unwrap();

        assert_eq!(directory.lookup("old-addr"), None);
        assert_eq!(directory.lookup("new-addr").as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let registry = Arc::new(FakeRegistry::default());
        registry.users.lock().push(User::new("alice", "addr1"));

        let directory = UserDirectory::new(registry.clone());
        directory.refresh().await.unwrap();
        let held = directory.snapshot();

        *registry.fail.lock() = true;
        assert!(matches!(
            directory.refresh().await,
            Err(TrackerError::Registry(_))
        ));
        assert_eq!(directory.lookup("addr1").as_deref(), Some("alice"));
        assert_eq!(held.lookup("addr1"), Some("alice"));
    }
}
