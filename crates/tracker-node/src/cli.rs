use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, trace};
use tracker_core::types::{Block, TipHash};
use tracker_core::{NodeConfig, Result, TrackerError};

use crate::client::{NodeClient, OP_GET_BLOCK, OP_GET_SELECTED_TIP_HASH};
use crate::wire::{parse_block, parse_selected_tip_hash};

/// Node client that shells out to the node-control command.
///
/// Queries share a bounded pool of permits, so independent queries may
/// overlap while the total number of child processes stays capped.
pub struct CliNodeClient {
    ctl_path: PathBuf,
    ctl_args: Vec<String>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl CliNodeClient {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            ctl_path: config.ctl_path.clone(),
            ctl_args: config.ctl_args.clone(),
            timeout: config.query_timeout(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_queries.max(1))),
        }
    }

    /// Run one operation and return its stdout if it exited successfully
    async fn run(&self, operation: &'static str, args: &[&str]) -> Result<Vec<u8>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TrackerError::Command {
                operation,
                status: "not started".to_string(),
                stderr: "query pool closed".to_string(),
            })?;

        let mut command = Command::new(&self.ctl_path);
        command
            .args(&self.ctl_args)
            .arg(operation)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        trace!(operation, ?args, "Running node query");
        let start = Instant::now();

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TrackerError::Command {
                    operation,
                    status: "spawn failed".to_string(),
                    stderr: e.to_string(),
                })
            }
            Err(_) => {
                return Err(TrackerError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        };

        let elapsed = start.elapsed();
        tracker_metrics::histograms::node_query_duration(elapsed, operation);
        debug!(
            operation,
            status = %output.status,
            duration_ms = elapsed.as_millis() as u64,
            "Node query finished"
        );

        // A non-zero exit is a command failure whatever stdout contains
        if !output.status.success() {
            return Err(TrackerError::Command {
                operation,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl NodeClient for CliNodeClient {
    async fn get_selected_tip_hash(&self) -> Result<TipHash> {
        let stdout = self.run(OP_GET_SELECTED_TIP_HASH, &[]).await?;
        parse_selected_tip_hash(&stdout)
    }

    async fn get_block(&self, hash: &TipHash) -> Result<Block> {
        let stdout = self.run(OP_GET_BLOCK, &[hash.as_str(), "true"]).await?;
        parse_block(hash, &stdout)
    }
}
