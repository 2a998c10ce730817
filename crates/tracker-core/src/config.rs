use crate::error::{Result, TrackerError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Node-control command settings
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Path of the node-control executable
    pub ctl_path: PathBuf,
    /// Arguments placed before every operation, e.g. the RPC server flag
    pub ctl_args: Vec<String>,
    /// Bounded wait for a single query (default: 10000)
    pub query_timeout_ms: u64,
    /// Maximum number of node queries in flight (default: 4)
    pub max_concurrent_queries: usize,
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|key| env::var(key).ok())
    }

    fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        let ctl_path = var("NODE_CTL_PATH")
            .map(|p| PathBuf::from(sanitize(&p)))
            .unwrap_or_else(|| PathBuf::from("./sedractl"));

        let ctl_args = var("NODE_CTL_ARGS")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let query_timeout_ms = var("NODE_QUERY_TIMEOUT_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000);

        let max_concurrent_queries = var("NODE_MAX_CONCURRENT_QUERIES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        Self {
            ctl_path,
            ctl_args,
            query_timeout_ms,
            max_concurrent_queries,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Telegram notification configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Enable Telegram notifications (default: true if bot_token and chat_id are set)
    pub enabled: bool,
    /// Telegram bot token from @BotFather
    pub bot_token: Option<String>,
    /// Chat ID or channel ID to send messages to
    pub chat_id: Option<String>,
    /// Forum topic inside the chat
    pub thread_id: Option<i64>,
    /// Bot API base URL
    pub api_url: String,
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|key| env::var(key).ok())
    }

    fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        let bot_token = var("TELEGRAM_BOT_TOKEN").filter(|s| !s.trim().is_empty());
        let chat_id = var("TELEGRAM_CHAT_ID").filter(|s| !s.trim().is_empty());
        let thread_id = var("TELEGRAM_THREAD_ID").and_then(|s| s.trim().parse().ok());
        let enabled = var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(bot_token.is_some() && chat_id.is_some());
        let api_url = var("TELEGRAM_API_URL")
            .map(|u| sanitize(&u).trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://api.telegram.org".to_string());

        Self {
            enabled,
            bot_token,
            chat_id,
            thread_id,
            api_url,
        }
    }

    /// Check if Telegram is fully configured and enabled
    pub fn is_configured(&self) -> bool {
        self.enabled && self.bot_token.is_some() && self.chat_id.is_some()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Loop cadence
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Minimum delay between two poll cycles (default: 10)
    pub poll_interval_ms: u64,
    /// Full reload period of the address directory (default: 300)
    pub user_refresh_interval_secs: u64,
    /// Period of the status log line (default: 60)
    pub status_interval_secs: u64,
}

impl PollConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|key| env::var(key).ok())
    }

    fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            poll_interval_ms: var("POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            user_refresh_interval_secs: var("USER_REFRESH_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            status_interval_secs: var("STATUS_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn user_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.user_refresh_interval_secs)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Failed-dispatch retry policy
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Total attempts per notification, first one included (default: 3)
    pub max_attempts: u32,
    /// Bound on queued failed notifications (default: 256)
    pub retry_queue_capacity: usize,
    /// Delay before the first retry, doubled per attempt (default: 5000)
    pub retry_delay_ms: u64,
    /// Most queued notifications retried in one cycle (default: 8)
    pub retries_per_cycle: usize,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|key| env::var(key).ok())
    }

    fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            max_attempts: var("DISPATCH_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_queue_capacity: var("DISPATCH_RETRY_QUEUE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            retry_delay_ms: var("DISPATCH_RETRY_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),
            retries_per_cycle: var("DISPATCH_RETRIES_PER_CYCLE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Complete tracker configuration, immutable after startup
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub node: NodeConfig,
    /// Address registry location
    pub registry_url: String,
    /// Where the last checked tip hash is persisted, if anywhere
    pub state_url: Option<String>,
    pub telegram: TelegramConfig,
    pub poll: PollConfig,
    pub dispatch: DispatchConfig,
    /// Block explorer base, without trailing slash
    pub explorer_base_url: String,
    /// Currency symbol shown in notifications
    pub reward_ticker: String,
    /// Only scan transactions the node marks as coinbase
    pub scan_coinbase_only: bool,
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        Self::from_vars(&|key| env::var(key).ok())
    }

    pub fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let registry_url = var("REGISTRY_DATABASE_URL")
            .map(|u| sanitize(&u))
            .unwrap_or_else(|| "sqlite://users.db".to_string());

        let state_url = var("STATE_DATABASE_URL")
            .map(|u| sanitize(&u))
            .filter(|u| !u.is_empty());

        let explorer_base_url = var("EXPLORER_BASE_URL")
            .map(|u| sanitize(&u).trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://explorer.sedracoin.com".to_string());

        let reward_ticker = var("REWARD_TICKER").unwrap_or_else(|| "SDR".to_string());

        let scan_coinbase_only = var("SCAN_COINBASE_ONLY")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let config = Self {
            node: NodeConfig::from_vars(var),
            registry_url,
            state_url,
            telegram: TelegramConfig::from_vars(var),
            poll: PollConfig::from_vars(var),
            dispatch: DispatchConfig::from_vars(var),
            explorer_base_url,
            reward_ticker,
            scan_coinbase_only,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll.poll_interval_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        if self.poll.user_refresh_interval_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "USER_REFRESH_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.poll.status_interval_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "STATUS_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.node.max_concurrent_queries == 0 {
            return Err(TrackerError::InvalidConfig(
                "NODE_MAX_CONCURRENT_QUERIES must be greater than zero".to_string(),
            ));
        }
        if self.dispatch.max_attempts == 0 {
            return Err(TrackerError::InvalidConfig(
                "DISPATCH_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.dispatch.retries_per_cycle == 0 {
            return Err(TrackerError::InvalidConfig(
                "DISPATCH_RETRIES_PER_CYCLE must be at least 1".to_string(),
            ));
        }
        if self.telegram.enabled && !self.telegram.is_configured() {
            return Err(TrackerError::MissingEnvVar(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID".to_string(),
            ));
        }
        Ok(())
    }
}

/// Remove surrounding quotes and whitespace
fn sanitize(value: &str) -> String {
    let trimmed = value.trim();
    let without_quotes = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    without_quotes.to_string()
}
