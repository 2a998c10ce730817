use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Time source for refresh and retry deadlines
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Paces the poll loop between cycles
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self);
}

/// Waits a fixed delay after every cycle, bounding the polling rate
#[derive(Debug, Clone)]
pub struct DelayTicker {
    delay: Duration,
}

impl DelayTicker {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Ticker for DelayTicker {
    async fn tick(&mut self) {
        tokio::time::sleep(self.delay).await;
    }
}
