//! Prize ladder with fireproof checkpoints.

use crate::types::{LEVEL_COUNT, MAX_LEVEL};
use serde::{Deserialize, Serialize};

/// Reference prize amounts, indexed by the level just cleared
pub const DEFAULT_PRIZES: [u64; LEVEL_COUNT] = [
    100, 200, 300, 500, 1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 64_000, 125_000, 250_000,
    500_000, 1_000_000,
];

/// Levels whose prize is kept even if a later answer is wrong
pub const DEFAULT_FIREPROOF_LEVELS: [u8; 3] = [4, 9, 14];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeLadder {
    prizes: [u64; LEVEL_COUNT],
    fireproof_levels: Vec<u8>,
}

impl PrizeLadder {
    /// Build a ladder. Checkpoints past the last level are dropped and the
    /// rest are kept sorted.
    pub fn new(prizes: [u64; LEVEL_COUNT], fireproof_levels: impl IntoIterator<Item = u8>) -> Self {
        let mut fireproof_levels: Vec<u8> = fireproof_levels
            .into_iter()
            .filter(|level| *level <= MAX_LEVEL)
            .collect();
        fireproof_levels.sort_unstable();
        fireproof_levels.dedup();

        Self {
            prizes,
            fireproof_levels,
        }
    }

    /// Prize for clearing `level`
    pub fn prize_for(&self, level: u8) -> u64 {
        self.prizes[usize::from(level.min(MAX_LEVEL))]
    }

    pub fn max_prize(&self) -> u64 {
        self.prizes[LEVEL_COUNT - 1]
    }

    pub fn prizes(&self) -> &[u64; LEVEL_COUNT] {
        &self.prizes
    }

    pub fn fireproof_levels(&self) -> &[u8] {
        &self.fireproof_levels
    }

    pub fn is_fireproof(&self, level: u8) -> bool {
        self.fireproof_levels.contains(&level)
    }

    /// Prize kept on failure when `answered_level` is the last level cleared.
    /// `None` means nothing has been cleared yet.
    pub fn fireproof_prize(&self, answered_level: Option<u8>) -> u64 {
        let Some(answered) = answered_level else {
            return 0;
        };

        self.fireproof_levels
            .iter()
            .rev()
            .find(|level| **level <= answered)
            .map(|level| self.prize_for(*level))
            .unwrap_or(0)
    }

    /// Check a ladder that did not come through `new`, e.g. one read back
    /// from storage
    pub fn validate(&self) -> Result<(), String> {
        if !self.prizes.windows(2).all(|w| w[0] < w[1]) {
            return Err(format!("prizes are not ascending: {:?}", self.prizes));
        }
        if !self.fireproof_levels.windows(2).all(|w| w[0] < w[1]) {
            return Err(format!(
                "fireproof levels are not sorted: {:?}",
                self.fireproof_levels
            ));
        }
        if let Some(level) = self.fireproof_levels.iter().find(|l| **l > MAX_LEVEL) {
            return Err(format!("fireproof level {} is past the ladder", level));
        }
        Ok(())
    }

    /// Prize for cashing out with `answered_level` as the last level cleared
    pub fn cash_out_prize(&self, answered_level: Option<u8>) -> u64 {
        answered_level.map(|level| self.prize_for(level)).unwrap_or(0)
    }
}

impl Default for PrizeLadder {
    fn default() -> Self {
        Self::new(DEFAULT_PRIZES, DEFAULT_FIREPROOF_LEVELS)
    }
}
