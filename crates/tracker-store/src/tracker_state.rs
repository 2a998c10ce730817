use tracker_core::types::TipHash;

/// Tracker statistics
#[derive(Debug, Clone, Default)]
pub struct TrackerStats {
    pub cycles: u64,
    pub blocks_processed: u64,
    pub reward_matches: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub notifications_dropped: u64,
    pub failed_cycles: u64,
}

/// Tip tracking state
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    /// Last tip hash whose block was fetched and scanned
    last_checked_hash: Option<TipHash>,

    /// Statistics
    pub stats: TrackerStats,
}

impl TrackerState {
    pub fn last_checked_hash(&self) -> Option<&TipHash> {
        self.last_checked_hash.as_ref()
    }

    /// Whether `hash` differs from the last checked one. An unset gate
    /// treats every hash as new.
    pub fn is_new_tip(&self, hash: &TipHash) -> bool {
        self.last_checked_hash.as_ref() != Some(hash)
    }

    /// Restore the gate from persisted state without counting a block
    pub fn restore(&mut self, hash: TipHash) {
        self.last_checked_hash = Some(hash);
    }

    /// Commit a fetched and scanned block
    pub fn commit(&mut self, hash: TipHash, matches: usize) {
        self.last_checked_hash = Some(hash);
        self.stats.blocks_processed += 1;
        self.stats.reward_matches += matches as u64;
    }

    pub fn record_cycle(&mut self) {
        self.stats.cycles += 1;
    }

    pub fn record_failed_cycle(&mut self) {
        self.stats.failed_cycles += 1;
    }

    pub fn record_sent(&mut self) {
        self.stats.notifications_sent += 1;
    }

    pub fn record_failed(&mut self) {
        self.stats.notifications_failed += 1;
    }

    pub fn record_dropped(&mut self) {
        self.stats.notifications_dropped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate() {
        let mut state = TrackerState::default();
        let a = TipHash::from("a");
        let b = TipHash::from("b");

        assert!(state.is_new_tip(&a));
        state.commit(a.clone(), 2);
        assert!(!state.is_new_tip(&a));
        assert!(state.is_new_tip(&b));
        assert_eq!(state.stats.blocks_processed, 1);
        assert_eq!(state.stats.reward_matches, 2);

        state.restore(b.clone());
        assert!(!state.is_new_tip(&b));
        assert_eq!(state.stats.blocks_processed, 1);
    }
}
