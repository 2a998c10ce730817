use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, trace, warn};
use tracker_core::types::TipHash;
use tracker_core::{Result, TrackerConfig, TrackerError};
use tracker_node::NodeClient;
use tracker_processor::{DeliveryReport, NotificationOutbox, RewardScanner};
use tracker_store::{CheckpointStore, TrackerStore};

use crate::schedule::{Clock, SystemClock, Ticker};

/// Where a failed cycle stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    RefreshingDirectory,
    FetchingTip,
    FetchingBlock,
}

/// Result of one poll cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Tip equals the last checked hash
    NoChange(TipHash),
    /// New tip fetched, scanned, dispatched and committed
    Processed {
        hash: TipHash,
        matches: usize,
        report: DeliveryReport,
    },
    /// Cycle abandoned; the gate was not advanced
    Failed {
        stage: CycleStage,
        error: TrackerError,
    },
}

/// Control loop: polls the tip, gates on novelty, fetches and scans new
/// blocks, dispatches reward notifications.
///
/// Cycles never overlap. `last_checked_hash` in the shared state only moves
/// after a block was fetched and scanned, so a failed fetch or parse leaves
/// the same tip to be retried on the next cycle.
pub struct TipTracker {
    node: Arc<dyn NodeClient>,
    store: Arc<TrackerStore>,
    scanner: RewardScanner,
    outbox: NotificationOutbox,
    checkpoint: Option<Arc<dyn CheckpointStore>>,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
}

impl TipTracker {
    pub fn new(
        config: &TrackerConfig,
        node: Arc<dyn NodeClient>,
        store: Arc<TrackerStore>,
        outbox: NotificationOutbox,
    ) -> Self {
        Self {
            node,
            store,
            scanner: RewardScanner::new(config.scan_coinbase_only),
            outbox,
            checkpoint: None,
            clock: Arc::new(SystemClock),
            refresh_interval: config.poll.user_refresh_interval(),
            last_refresh: None,
        }
    }

    /// Persist the last checked hash across restarts
    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<TrackerStore> {
        &self.store
    }

    /// Number of notifications waiting for a retry
    pub fn pending_notifications(&self) -> usize {
        self.outbox.pending()
    }

    /// Mandatory startup work: load the directory and restore the gate.
    ///
    /// A registry failure here is fatal since there is nothing to match
    /// against. A checkpoint failure only costs possible duplicate alerts.
    pub async fn start(&mut self) -> Result<()> {
        self.refresh_directory().await?;

        if let Some(checkpoint) = self.checkpoint.as_ref() {
            match checkpoint.load().await {
                Ok(Some(hash)) => {
                    info!(hash = %hash, "Resuming from persisted tip hash");
                    self.store.state.write().await.restore(hash);
                }
                Ok(None) => info!("No persisted tip hash, first tip will be processed"),
                Err(e) => {
                    warn!(error = %e, "Failed to load persisted tip hash, first tip will be processed")
                }
            }
        }
        Ok(())
    }

    /// Run cycles until shutdown is signalled. The signal is honoured
    /// between cycles; a cycle in progress runs to completion.
    pub async fn run<T: Ticker>(
        &mut self,
        ticker: &mut T,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        info!(
            users = self.store.directory.len(),
            refresh_interval_secs = self.refresh_interval.as_secs(),
            "Tip tracker running"
        );

        loop {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => {
                    info!("Shutdown requested, stopping before next cycle");
                    break;
                }
            }

            self.run_cycle().await;

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = ticker.tick() => {}
            }
        }

        info!("Tip tracker stopped");
        Ok(())
    }

    /// One full cycle. Every failure is logged here and reported in the
    /// outcome; none of them is fatal.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        tracker_metrics::counters::cycles(1);
        self.store.state.write().await.record_cycle();

        let outcome = self.cycle().await;

        if let CycleOutcome::Failed { stage, error } = &outcome {
            tracker_metrics::counters::errors(1, error.kind());
            self.store.state.write().await.record_failed_cycle();
            let last_checked = self.store.state.read().await.last_checked_hash().cloned();
            error!(
                stage = ?stage,
                kind = error.kind(),
                error = %error,
                last_checked = ?last_checked.as_ref().map(TipHash::as_str),
                "Cycle failed, retrying next tick"
            );
        }
        outcome
    }

    async fn cycle(&mut self) -> CycleOutcome {
        let now = self.clock.now();

        if self.refresh_due(now) {
            if let Err(error) = self.refresh_directory().await {
                return CycleOutcome::Failed {
                    stage: CycleStage::RefreshingDirectory,
                    error,
                };
            }
        }

        let retried = self.outbox.retry_due(now).await;
        self.record_delivery(retried).await;

        // Idle -> FetchingTip
        let hash = match self.node.get_selected_tip_hash().await {
            Ok(hash) => hash,
            Err(error) => {
                return CycleOutcome::Failed {
                    stage: CycleStage::FetchingTip,
                    error,
                }
            }
        };

        // FetchingTip -> NoChange
        if !self.store.state.read().await.is_new_tip(&hash) {
            trace!(hash = %hash, "Tip unchanged");
            return CycleOutcome::NoChange(hash);
        }

        // FetchingTip -> FetchingBlock
        info!(hash = %hash, "New tip, fetching block");
        let started = Instant::now();
        let block = match self.node.get_block(&hash).await {
            Ok(block) => block,
            Err(error) => {
                return CycleOutcome::Failed {
                    stage: CycleStage::FetchingBlock,
                    error,
                }
            }
        };

        // FetchingBlock -> Scanning
        let directory = self.store.directory.snapshot();
        let events = self.scanner.scan(&block, &directory);
        debug!(
            hash = %hash,
            transactions = block.transactions.len(),
            outputs = block.output_count(),
            matches = events.len(),
            "Block scanned"
        );

        // Scanning -> Dispatching
        let report = self.outbox.deliver(&events, self.clock.now()).await;
        self.record_delivery(report).await;

        // Dispatching -> Idle: the only place the gate moves
        self.store
            .state
            .write()
            .await
            .commit(hash.clone(), events.len());
        self.persist(&hash).await;

        tracker_metrics::counters::blocks_processed(1);
        tracker_metrics::counters::reward_matches(events.len() as u64);
        tracker_metrics::histograms::cycle_duration(started.elapsed());

        if !events.is_empty() {
            info!(
                hash = %hash,
                matches = events.len(),
                delivered = report.delivered,
                failed = report.failed,
                "Reward notifications dispatched"
            );
        }

        CycleOutcome::Processed {
            hash,
            matches: events.len(),
            report,
        }
    }

    fn refresh_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.refresh_interval,
        }
    }

    async fn refresh_directory(&mut self) -> Result<()> {
        let count = self.store.directory.refresh().await?;
        self.last_refresh = Some(self.clock.now());
        tracker_metrics::counters::directory_refreshes(1);
        tracker_metrics::gauges::set_directory_users(count);
        Ok(())
    }

    async fn record_delivery(&self, report: DeliveryReport) {
        if report == DeliveryReport::default() {
            return;
        }
        let mut state = self.store.state.write().await;
        for _ in 0..report.delivered {
            state.record_sent();
        }
        for _ in 0..report.failed {
            state.record_failed();
        }
        for _ in 0..report.dropped {
            state.record_dropped();
        }
    }

    async fn persist(&self, hash: &TipHash) {
        if let Some(checkpoint) = self.checkpoint.as_ref() {
            if let Err(e) = checkpoint.save(hash).await {
                tracker_metrics::counters::errors(1, e.kind());
                warn!(hash = %hash, error = %e, "Failed to persist tip hash");
            }
        }
    }
}
