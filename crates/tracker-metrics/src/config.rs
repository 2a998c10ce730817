use std::net::SocketAddr;

use crate::{MetricsError, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9090;

/// Settings for the Prometheus scrape endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Serve the endpoint at all; off unless METRICS_PORT or METRICS_ENABLED is set
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MetricsConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|name| std::env::var(name).ok())
    }

    fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        let port_var = var("METRICS_PORT");
        let enabled = match var("METRICS_ENABLED") {
            Some(v) => v.trim().eq_ignore_ascii_case("true") || v.trim() == "1",
            None => port_var.is_some(),
        };

        Self {
            enabled,
            host: var("METRICS_HOST")
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port_var
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    /// Address to bind the endpoint to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| MetricsError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> MetricsConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MetricsConfig::from_vars(&|name| vars.get(name).cloned())
    }

    #[test]
    fn test_disabled_by_default() {
        let config = config(&[]);
        assert!(!config.enabled);
        assert_eq!(config.socket_addr().unwrap().port(), DEFAULT_PORT);
    }

    #[test]
    fn test_port_enables_endpoint() {
        let config = config(&[("METRICS_PORT", "9100"), ("METRICS_HOST", "127.0.0.1")]);
        assert!(config.enabled);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn test_explicit_disable_wins_over_port() {
        let config = config(&[("METRICS_PORT", "9100"), ("METRICS_ENABLED", "false")]);
        assert!(!config.enabled);
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let config = config(&[("METRICS_HOST", "not a host")]);
        assert!(matches!(config.socket_addr(), Err(MetricsError::InvalidAddress(_))));
    }
}
