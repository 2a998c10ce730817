use std::fmt;

use super::TipHash;

/// Smallest units per whole coin
pub const SOMPI_PER_COIN: u64 = 100_000_000;

/// Reward amount, kept in the smallest unit and rendered with 8 decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reward(u64);

impl Reward {
    pub fn from_raw(amount_raw: u64) -> Self {
        Self(amount_raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.0 / SOMPI_PER_COIN, self.0 % SOMPI_PER_COIN)
    }
}

/// A reward output credited to a known address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardMatchEvent {
    pub username: String,
    pub address: String,
    pub reward: Reward,
    pub block_hash: TipHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_formatting() {
        assert_eq!(Reward::from_raw(123_456_789).to_string(), "1.23456789");
        assert_eq!(Reward::from_raw(0).to_string(), "0.00000000");
        assert_eq!(Reward::from_raw(500_000_000).to_string(), "5.00000000");
        assert_eq!(Reward::from_raw(1).to_string(), "0.00000001");
    }

    #[test]
    fn test_reward_formatting_is_exact_for_large_amounts() {
        // f64 would round this one
        assert_eq!(
            Reward::from_raw(u64::MAX).to_string(),
            "184467440737.09551615"
        );
    }
}
