mod schedule;
mod tip_tracker;

pub use schedule::{Clock, DelayTicker, SystemClock, Ticker};
pub use tip_tracker::{CycleOutcome, CycleStage, TipTracker};
