use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracker_core::types::RewardMatchEvent;
use tracker_core::DispatchConfig;

use crate::dispatchers::NotificationDispatcher;

/// How failed notifications are retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per notification, first one included
    pub max_attempts: u32,
    /// Maximum number of notifications waiting for a retry
    pub queue_capacity: usize,
    /// Delay before the first retry, doubled for every further one
    pub base_delay: Duration,
    /// Most retries sent in one pass, so a dead channel cannot stall polling
    pub retries_per_pass: usize,
}

impl RetryPolicy {
    /// Single attempt, nothing queued
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            queue_capacity: 0,
            base_delay: Duration::ZERO,
            retries_per_pass: 0,
        }
    }

    fn delay_after(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            queue_capacity: config.retry_queue_capacity,
            base_delay: config.retry_delay(),
            retries_per_pass: config.retries_per_cycle.max(1),
        }
    }
}

/// Outcome counts of one delivery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub dropped: usize,
}

impl DeliveryReport {
    fn merge(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.dropped += other.dropped;
    }
}

#[derive(Debug, Clone)]
struct PendingNotification {
    event: RewardMatchEvent,
    attempts: u32,
    next_attempt_at: Instant,
}

/// Delivers reward events in order and keeps failed ones for a bounded retry
pub struct NotificationOutbox {
    dispatcher: Arc<dyn NotificationDispatcher>,
    policy: RetryPolicy,
    pending: VecDeque<PendingNotification>,
}

impl NotificationOutbox {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, policy: RetryPolicy) -> Self {
        Self {
            dispatcher,
            policy,
            pending: VecDeque::new(),
        }
    }

    /// Number of notifications waiting for another attempt
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Attempt each event once, in order. A failure never stops the
    /// remaining events.
    pub async fn deliver(&mut self, events: &[RewardMatchEvent], now: Instant) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for event in events {
            report.merge(self.attempt(event.clone(), 0, now).await);
        }
        tracker_metrics::gauges::set_retry_queue_depth(self.pending.len());
        report
    }

    /// Retry queued notifications whose delay has elapsed, oldest first and
    /// at most `retries_per_pass` of them. The rest keep their place.
    pub async fn retry_due(&mut self, now: Instant) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if self.pending.is_empty() {
            return report;
        }

        let limit = self.policy.retries_per_pass;
        let mut due = Vec::new();
        let mut waiting = VecDeque::with_capacity(self.pending.len());
        for entry in self.pending.drain(..) {
            if due.len() < limit && entry.next_attempt_at <= now {
                due.push(entry);
            } else {
                waiting.push_back(entry);
            }
        }
        self.pending = waiting;

        for entry in due {
            report.merge(self.attempt(entry.event, entry.attempts, now).await);
        }
        tracker_metrics::gauges::set_retry_queue_depth(self.pending.len());
        report
    }

    async fn attempt(
        &mut self,
        event: RewardMatchEvent,
        previous_attempts: u32,
        now: Instant,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let attempts = previous_attempts + 1;
        let start = Instant::now();
        let result = self.dispatcher.dispatch(&event).await;
        tracker_metrics::histograms::dispatch_duration(start.elapsed());

        match result {
            Ok(()) => {
                info!(
                    username = %event.username,
                    reward = %event.reward,
                    block = %event.block_hash,
                    attempts,
                    "Notification sent"
                );
                tracker_metrics::counters::notifications_sent(1);
                report.delivered += 1;
            }
            Err(e) => {
                tracker_metrics::counters::notifications_failed(1);
                tracker_metrics::counters::errors(1, e.kind());
                report.failed += 1;

                if attempts >= self.policy.max_attempts {
                    error!(
                        error = %e,
                        username = %event.username,
                        block = %event.block_hash,
                        attempts,
                        "Notification failed, giving up"
                    );
                    tracker_metrics::counters::notifications_dropped(1);
                    report.dropped += 1;
                } else {
                    warn!(
                        error = %e,
                        username = %event.username,
                        block = %event.block_hash,
                        attempts,
                        "Notification failed, queued for retry"
                    );
                    report.dropped += self.enqueue(PendingNotification {
                        next_attempt_at: now + self.policy.delay_after(attempts),
                        event,
                        attempts,
                    });
                }
            }
        }
        report
    }

    /// Queue a failed notification, evicting the oldest one when full.
    /// Returns how many were dropped.
    fn enqueue(&mut self, entry: PendingNotification) -> usize {
        if self.policy.queue_capacity == 0 {
            error!(block = %entry.event.block_hash, "Retry queue disabled, dropping notification");
            tracker_metrics::counters::notifications_dropped(1);
            return 1;
        }

        let mut dropped = 0;
        while self.pending.len() >= self.policy.queue_capacity {
            if let Some(evicted) = self.pending.pop_front() {
                warn!(
                    username = %evicted.event.username,
                    block = %evicted.event.block_hash,
                    "Retry queue full, dropping oldest notification"
                );
                tracker_metrics::counters::notifications_dropped(1);
                dropped += 1;
            }
        }
        self.pending.push_back(entry);
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tracker_core::types::{Reward, TipHash};
    use tracker_core::{Result, TrackerError};

    /// Records every attempt; fails while `failures_left` is positive
    #[derive(Default)]
    struct FlakyDispatcher {
        attempts: Mutex<Vec<String>>,
        failures_left: Mutex<usize>,
    }

    #[async_trait]
    impl NotificationDispatcher for FlakyDispatcher {
        async fn dispatch(&self, event: &RewardMatchEvent) -> Result<()> {
            self.attempts.lock().push(event.username.clone());
            let mut left = self.failures_left.lock();
            if *left > 0 {
                *left -= 1;
                return Err(TrackerError::Dispatch("429 Too Many Requests".to_string()));
            }
            Ok(())
        }
    }

    fn event(username: &str) -> RewardMatchEvent {
        RewardMatchEvent {
            username: username.to_string(),
            address: format!("{}-addr", username),
            reward: Reward::from_raw(100),
            block_hash: TipHash::from("A"),
        }
    }

    fn policy(max_attempts: u32, queue_capacity: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            queue_capacity,
            base_delay: Duration::from_secs(5),
            retries_per_pass: 16,
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_remaining() {
        let dispatcher = Arc::new(FlakyDispatcher::default());
        *dispatcher.failures_left.lock() = 1;
        let mut outbox = NotificationOutbox::new(dispatcher.clone(), RetryPolicy::no_retry());

        let report = outbox
            .deliver(&[event("alice"), event("bob")], Instant::now())
            .await;

        assert_eq!(*dispatcher.attempts.lock(), vec!["alice", "bob"]);
        assert_eq!(
            report,
            DeliveryReport {
                delivered: 1,
                failed: 1,
                dropped: 1
            }
        );
        assert_eq!(outbox.pending(), 0);
    }

    #[tokio::test]
    async fn test_retry_after_delay() {
        let dispatcher = Arc::new(FlakyDispatcher::default());
        *dispatcher.failures_left.lock() = 1;
        let mut outbox = NotificationOutbox::new(dispatcher.clone(), policy(3, 10));
        let t0 = Instant::now();

        let report = outbox.deliver(&[event("alice")], t0).await;
        assert_eq!(report.failed, 1);
        assert_eq!(outbox.pending(), 1);

        // Not due yet
        let report = outbox.retry_due(t0 + Duration::from_secs(1)).await;
        assert_eq!(report, DeliveryReport::default());
        assert_eq!(dispatcher.attempts.lock().len(), 1);

        let report = outbox.retry_due(t0 + Duration::from_secs(5)).await;
        assert_eq!(report.delivered, 1);
        assert_eq!(outbox.pending(), 0);
        assert_eq!(dispatcher.attempts.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let dispatcher = Arc::new(FlakyDispatcher::default());
        *dispatcher.failures_left.lock() = usize::MAX;
        let mut outbox = NotificationOutbox::new(dispatcher.clone(), policy(2, 10));
        let t0 = Instant::now();

        outbox.deliver(&[event("alice")], t0).await;
        assert_eq!(outbox.pending(), 1);

        let report = outbox.retry_due(t0 + Duration::from_secs(60)).await;
        assert_eq!(report.dropped, 1);
        assert_eq!(outbox.pending(), 0);
        assert_eq!(dispatcher.attempts.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_evicts_oldest() {
        let dispatcher = Arc::new(FlakyDispatcher::default());
        *dispatcher.failures_left.lock() = 3;
        let mut outbox = NotificationOutbox::new(dispatcher.clone(), policy(5, 2));
        let t0 = Instant::now();

        let report = outbox
            .deliver(&[event("a"), event("b"), event("c")], t0)
            .await;
        assert_eq!(report.failed, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(outbox.pending(), 2);

        let report = outbox.retry_due(t0 + Duration::from_secs(5)).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(*dispatcher.attempts.lock(), vec!["a", "b", "c", "b", "c"]);
    }

    #[tokio::test]
    async fn test_retries_capped_per_pass() {
        let dispatcher = Arc::new(FlakyDispatcher::default());
        *dispatcher.failures_left.lock() = 3;
        let mut outbox = NotificationOutbox::new(
            dispatcher.clone(),
            RetryPolicy {
                retries_per_pass: 2,
                ..policy(3, 10)
            },
        );
        let t0 = Instant::now();

        outbox
            .deliver(&[event("a"), event("b"), event("c")], t0)
            .await;
        assert_eq!(outbox.pending(), 3);

        let later = t0 + Duration::from_secs(5);
        let report = outbox.retry_due(later).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(outbox.pending(), 1);

        let report = outbox.retry_due(later).await;
        assert_eq!(report.delivered, 1);
        assert_eq!(outbox.pending(), 0);
        assert_eq!(
            *dispatcher.attempts.lock(),
            vec!["a", "b", "c", "a", "b", "c"]
        );
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy(5, 1);
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after(3), Duration::from_secs(20));
    }
}
