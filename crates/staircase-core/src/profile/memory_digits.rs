//! Digit-span memory: tuned profile.
//!
//! Promotion needs three successes in a row whose mean response time meets
//! the level's goal. Any failure demotes, and so does a single response
//! slower than 1.25× the goal.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{Decision, GameParams, GameProfile, StaircaseState, MIN_LEVEL, TUNED_MAX_LEVEL};
use crate::model::{AdjustmentReason, Engine, GameType, Trial};
use crate::statistics::mean_recent_success_rt;

/// Successes in a row required before a promotion is considered.
const STREAK_TO_PROMOTE: u32 = 3;
/// A response slower than `goal × SLOW_FACTOR` demotes.
const SLOW_FACTOR: f64 = 1.25;

/// Digits shown per level; pairs of levels share a length.
const DIGITS_BY_LEVEL: [u32; TUNED_MAX_LEVEL as usize] = [
    3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12,
];

/// Parameters for one digit-span round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDigitsParams {
    pub digits_len: u32,
    /// Total exposure for the whole sequence.
    pub exposure_time_ms: u32,
    pub has_decoy_digits: bool,
    /// Target recall time; drives promotion and slow-response demotion.
    pub goal_rt_ms: u32,
}

impl MemoryDigitsParams {
    /// Build parameters for a digit count at a level.
    pub(crate) fn for_level(level: u32, digits_len: u32) -> Self {
        Self {
            digits_len,
            exposure_time_ms: exposure_per_digit_ms(level) * digits_len,
            has_decoy_digits: level >= 6,
            goal_rt_ms: goal_rt_ms(digits_len),
        }
    }
}

/// 3.5 s plus 0.2 s for every digit beyond three.
pub fn goal_rt_ms(digits_len: u32) -> u32 {
    3500 + 200 * digits_len.saturating_sub(3)
}

/// Per-digit exposure: 2 s at level 1, 100 ms less per level, floor 500 ms.
pub fn exposure_per_digit_ms(level: u32) -> u32 {
    2000u32
        .saturating_sub(100 * level.saturating_sub(1))
        .max(500)
}

/// Tuned digit-span profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDigitsProfile;

impl MemoryDigitsProfile {
    pub fn params(&self, level: u32) -> MemoryDigitsParams {
        let level = self.clamp_level(level);
        MemoryDigitsParams::for_level(level, DIGITS_BY_LEVEL[(level - MIN_LEVEL) as usize])
    }
}

impl GameProfile for MemoryDigitsProfile {
    fn game(&self) -> GameType {
        GameType::MemoryDigits
    }

    fn engine(&self) -> Engine {
        Engine::Tuned
    }

    fn max_level(&self) -> u32 {
        TUNED_MAX_LEVEL
    }

    fn level_params(&self, level: u32) -> GameParams {
        GameParams::MemoryDigits(self.params(level))
    }

    fn evaluate(
        &self,
        trial: &Trial,
        window: &VecDeque<Trial>,
        state: &mut StaircaseState,
    ) -> Decision {
        let goal = f64::from(self.params(state.level).goal_rt_ms);

        if trial.success {
            state.consecutive_correct += 1;
            if state.consecutive_correct >= STREAK_TO_PROMOTE {
                let fast_enough = mean_recent_success_rt(window, STREAK_TO_PROMOTE as usize)
                    .is_some_and(|mean_rt| mean_rt <= goal);
                if fast_enough && state.can_promote() {
                    return Decision::Promote(AdjustmentReason::StreakCompleted);
                }
            }
        } else {
            state.consecutive_correct = 0;
            if state.can_demote() {
                return Decision::Demote(AdjustmentReason::Failure);
            }
        }

        if trial
            .response_time_ms
            .is_some_and(|rt| rt > goal * SLOW_FACTOR)
        {
            state.consecutive_correct = 0;
            if state.can_demote() {
                return Decision::Demote(AdjustmentReason::TooSlow);
            }
        }

        Decision::Hold
    }
}
