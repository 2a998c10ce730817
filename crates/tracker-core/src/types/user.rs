/// A registered miner: display name plus reward address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    /// Unique key in the registry
    pub address: String,
}

impl User {
    pub fn new(username: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            address: address.into(),
        }
    }
}
