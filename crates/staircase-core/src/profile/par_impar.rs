//! Parity classification: tuned profile.
//!
//! Each trial is a round of several numbers. The caller reports round
//! accuracy and mean per-item response time in the trial metadata; the
//! staircase reads those instead of the bare success flag.
//!
//! Missing or non-finite accuracy fails the demotion floor. Missing mean RT
//! only blocks promotion. A round that is both inaccurate and slow reports
//! `LowAccuracy`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{Decision, GameParams, GameProfile, StaircaseState, TUNED_MAX_LEVEL};
use crate::model::{AdjustmentReason, Engine, GameType, Trial};

const STREAK_TO_PROMOTE: u32 = 3;
const PROMOTE_ACCURACY: f64 = 0.85;
const DEMOTE_ACCURACY: f64 = 0.65;
const SLOW_FACTOR: f64 = 1.25;

/// Parameters for one parity round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParImparParams {
    /// Numbers shown in the round.
    pub k: u32,
    /// Digits per number.
    pub digits_len: u32,
    /// Exposure for the whole round.
    pub exposure_total_ms: u32,
    /// Target mean response time per item.
    pub goal_rt_ms: u32,
    pub has_distractors: bool,
}

/// Tuned parity profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParImparProfile;

impl ParImparProfile {
    pub fn params(&self, level: u32) -> ParImparParams {
        let level = self.clamp_level(level);
        let step = level - 1;
        ParImparParams {
            k: (8 + step / 2).min(20),
            digits_len: (3 + step / 5).min(6),
            exposure_total_ms: 12_000u32.saturating_sub(step * 400).max(4_000),
            goal_rt_ms: 900u32.saturating_sub((step / 3) * 50).max(600),
            has_distractors: level > 15,
        }
    }
}

/// Usable metadata value: present and a finite number.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl GameProfile for ParImparProfile {
    fn game(&self) -> GameType {
        GameType::ParImpar
    }

    fn engine(&self) -> Engine {
        Engine::Tuned
    }

    fn max_level(&self) -> u32 {
        TUNED_MAX_LEVEL
    }

    fn level_params(&self, level: u32) -> GameParams {
        GameParams::ParImpar(self.params(level))
    }

    fn evaluate(
        &self,
        trial: &Trial,
        _window: &VecDeque<Trial>,
        state: &mut StaircaseState,
    ) -> Decision {
        let goal = f64::from(self.params(state.level).goal_rt_ms);
        let accuracy = finite(trial.metadata.accuracy);
        let mean_rt = finite(trial.metadata.mean_rt);

        if trial.success && accuracy.is_some_and(|a| a >= PROMOTE_ACCURACY) {
            state.consecutive_correct += 1;
            if state.consecutive_correct >= STREAK_TO_PROMOTE
                && mean_rt.is_some_and(|rt| rt <= goal)
                && state.can_promote()
            {
                return Decision::Promote(AdjustmentReason::StreakCompleted);
            }
        }

        // The streak survives a middling round; only a demotion-worthy
        // round clears it.
        let low_accuracy = !accuracy.is_some_and(|a| a >= DEMOTE_ACCURACY);
        let too_slow = mean_rt.is_some_and(|rt| rt > goal * SLOW_FACTOR);
        if low_accuracy || too_slow {
            state.consecutive_correct = 0;
            if state.can_demote() {
                let reason = if low_accuracy {
                    AdjustmentReason::LowAccuracy
                } else {
                    AdjustmentReason::TooSlow
                };
                return Decision::Demote(reason);
            }
        }

        Decision::Hold
    }
}
