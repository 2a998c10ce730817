use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use tracker_core::TrackerConfig;
use tracker_db::{DatabaseConfig, DatabasePool, SqlCheckpointStore, SqlUserRegistry};
use tracker_metrics::{MetricsConfig, MetricsServer, Readiness};
use tracker_node::CliNodeClient;
use tracker_processor::{
    LogDispatcher, MessageTemplate, NotificationDispatcher, NotificationOutbox, RetryPolicy,
    TelegramDispatcher, TelegramNotifier,
};
use tracker_store::TrackerStore;
use tracker_sync::{DelayTicker, TipTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("tracker_sync=info".parse()?)
                .add_directive("tracker_processor=info".parse()?),
        )
        .init();

    info!("Reward tracker starting...");

    let config = match TrackerConfig::load() {
        Ok(config) => {
            info!(
                ctl_path = %config.node.ctl_path.display(),
                poll_interval_ms = config.poll.poll_interval_ms,
                user_refresh_interval_secs = config.poll.user_refresh_interval_secs,
                explorer = %config.explorer_base_url,
                coinbase_only = config.scan_coinbase_only,
                "Configuration loaded"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Metrics (optional - only if METRICS_PORT or METRICS_ENABLED is set)
    let readiness = Readiness::new();
    let metrics_config = MetricsConfig::from_env();
    if metrics_config.enabled {
        match tracker_metrics::init() {
            Ok(handle) => {
                tracker_metrics::spawn_upkeep(handle.clone(), tracker_metrics::UPKEEP_INTERVAL);
                let metrics_server = MetricsServer::new(metrics_config, handle, readiness.clone());
                tokio::spawn(async move {
                    if let Err(e) = metrics_server.run().await {
                        error!(error = %e, "Metrics server error");
                    }
                });
                info!("Metrics server started");
            }
            Err(e) => warn!(error = %e, "Failed to install metrics recorder, continuing without metrics"),
        }
    }

    // Registry is read-only and must be reachable at startup
    let registry_pool = match DatabasePool::new(&DatabaseConfig::registry(&config.registry_url)).await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to open user registry");
            std::process::exit(1);
        }
    };
    if let Err(e) = registry_pool.health_check().await {
        error!(error = %e, "User registry health check failed");
        std::process::exit(1);
    }
    let registry = Arc::new(SqlUserRegistry::new(registry_pool.clone()));

    // Checkpoint database (optional - only if STATE_DATABASE_URL is set)
    let state_pool = match config.state_url.as_deref() {
        Some(url) => match DatabasePool::new(&DatabaseConfig::state(url)).await {
            Ok(pool) => {
                if let Err(e) = pool.migrate().await {
                    error!(error = %e, "Failed to run state database migrations");
                    std::process::exit(1);
                }
                info!("State database connected and migrations applied");
                Some(pool)
            }
            Err(e) => {
                error!(error = %e, "Failed to open state database");
                std::process::exit(1);
            }
        },
        None => {
            warn!("STATE_DATABASE_URL not set, a restart may repeat the last notification");
            None
        }
    };

    let template = MessageTemplate::new(&config.explorer_base_url, &config.reward_ticker);
    let dispatcher: Arc<dyn NotificationDispatcher> = if config.telegram.is_configured() {
        match TelegramNotifier::new(&config.telegram) {
            Ok(notifier) => {
                info!(thread_id = ?config.telegram.thread_id, "Telegram dispatcher configured");
                Arc::new(TelegramDispatcher::new(notifier, template))
            }
            Err(e) => {
                error!(error = %e, "Failed to create Telegram client");
                std::process::exit(1);
            }
        }
    } else {
        warn!("Telegram not configured, notifications will only be logged");
        Arc::new(LogDispatcher::new(template))
    };

    let policy = RetryPolicy::from(&config.dispatch);
    info!(
        max_attempts = policy.max_attempts,
        queue_capacity = policy.queue_capacity,
        retries_per_pass = policy.retries_per_pass,
        retry_delay_ms = config.dispatch.retry_delay_ms,
        "Dispatch retry policy"
    );
    let outbox = NotificationOutbox::new(dispatcher, policy);

    let store = Arc::new(TrackerStore::new(registry));
    let node = Arc::new(CliNodeClient::new(&config.node));

    let mut tracker = TipTracker::new(&config, node, store.clone(), outbox);
    if let Some(pool) = state_pool.clone() {
        tracker = tracker.with_checkpoint(Arc::new(SqlCheckpointStore::new(pool)));
    }

    // Initial directory load is mandatory
    if let Err(e) = tracker.start().await {
        error!(error = %e, "Failed to load user directory");
        std::process::exit(1);
    }
    readiness.set_ready(true);

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received (Ctrl+C)");
        shutdown_tx_clone.send(()).ok();
    });

    // Spawn status printer
    let store_clone = store.clone();
    let status_interval = config.poll.status_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(status_interval);
        loop {
            interval.tick().await;
            let state = store_clone.state.read().await;
            info!(
                last_checked = ?state.last_checked_hash().map(|h| h.as_str()),
                users = store_clone.directory.len(),
                cycles = state.stats.cycles,
                failed_cycles = state.stats.failed_cycles,
                blocks = state.stats.blocks_processed,
                matches = state.stats.reward_matches,
                sent = state.stats.notifications_sent,
                failed = state.stats.notifications_failed,
                dropped = state.stats.notifications_dropped,
                "Status"
            );
            tracker_metrics::gauges::set_directory_users(store_clone.directory.len());
        }
    });

    let mut ticker = DelayTicker::new(config.poll.poll_interval());
    if let Err(e) = tracker.run(&mut ticker, shutdown_rx).await {
        error!(error = %e, "Tip tracker error");
        std::process::exit(1);
    }

    info!("Shutting down...");
    if tracker.pending_notifications() > 0 {
        warn!(
            pending = tracker.pending_notifications(),
            "Exiting with undelivered notifications"
        );
    }

    if let Some(pool) = state_pool {
        pool.close().await;
    }
    registry_pool.close().await;
    info!("Database connections closed");

    info!("Reward tracker shutdown complete");
    Ok(())
}
