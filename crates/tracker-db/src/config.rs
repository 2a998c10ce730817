use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://users.db`
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How long a statement waits on a locked database, in seconds
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Open without write access
    #[serde(default)]
    pub read_only: bool,

    /// Create the database file if it does not exist
    #[serde(default)]
    pub create_if_missing: bool,
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5
}

impl DatabaseConfig {
    /// The address registry is owned by another process; only read it
    pub fn registry(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
            busy_timeout_secs: default_busy_timeout(),
            read_only: true,
            create_if_missing: false,
        }
    }

    /// Tracker-owned state database
    pub fn state(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: 1,
            connect_timeout_secs: default_connect_timeout(),
            busy_timeout_secs: default_busy_timeout(),
            read_only: false,
            create_if_missing: true,
        }
    }
}
