//! Schulte table: tuned profile.
//!
//! Two successes in a row promote when the latest completion is within the
//! level's target time. A failure demotes, as does a completion slower than
//! 1.5× the target even if the table was solved.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Decision, GameParams, GameProfile, StaircaseState, MIN_LEVEL, TUNED_MAX_LEVEL};
use crate::model::{AdjustmentReason, Engine, GameType, Trial};

use self::SchulteLayout::{Dispersed, Grid};
use self::SchulteMode::{Descending, Fibonacci, Letters, Multiples, Numbers, Primes};

const STREAK_TO_PROMOTE: u32 = 2;
const SLOW_FACTOR: f64 = 1.5;

/// How the cells are arranged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchulteLayout {
    Grid,
    Dispersed,
}

impl fmt::Display for SchulteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchulteLayout::Grid => write!(f, "grid"),
            SchulteLayout::Dispersed => write!(f, "dispersed"),
        }
    }
}

/// What the player searches for, and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchulteMode {
    /// Ascending numbers.
    Numbers,
    Letters,
    /// Numbers in descending order.
    Descending,
    /// Only multiples of three, among distractors.
    Multiples,
    Primes,
    Fibonacci,
}

impl fmt::Display for SchulteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchulteMode::Numbers => "numbers",
            SchulteMode::Letters => "letters",
            SchulteMode::Descending => "descending",
            SchulteMode::Multiples => "multiples",
            SchulteMode::Primes => "primes",
            SchulteMode::Fibonacci => "fibonacci",
        };
        f.write_str(s)
    }
}

/// One row of the Schulte level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchulteParams {
    /// Number of cells.
    pub n: u32,
    pub layout: SchulteLayout,
    /// Whether the next target is highlighted.
    pub has_guide: bool,
    pub target_time_ms: u32,
    pub mode: SchulteMode,
    pub has_distractors: bool,
    /// Colour-word interference on letters.
    pub has_stroop: bool,
}

const fn row(
    n: u32,
    layout: SchulteLayout,
    has_guide: bool,
    target_time_ms: u32,
    mode: SchulteMode,
    has_distractors: bool,
) -> SchulteParams {
    SchulteParams {
        n,
        layout,
        has_guide,
        target_time_ms,
        mode,
        has_distractors,
        has_stroop: false,
    }
}

const LEVELS: [SchulteParams; TUNED_MAX_LEVEL as usize] = [
    row(9, Grid, true, 15_000, Numbers, false),
    row(9, Dispersed, true, 16_000, Numbers, false),
    row(16, Grid, true, 20_000, Numbers, false),
    row(16, Dispersed, true, 22_000, Numbers, false),
    row(25, Grid, true, 25_000, Numbers, false),
    row(25, Dispersed, false, 28_000, Numbers, false),
    row(36, Grid, false, 30_000, Numbers, false),
    row(36, Dispersed, false, 33_000, Numbers, false),
    row(49, Grid, false, 35_000, Numbers, false),
    row(49, Dispersed, false, 38_000, Numbers, false),
    row(25, Grid, false, 28_000, Letters, false),
    SchulteParams {
        has_stroop: true,
        ..row(25, Dispersed, false, 30_000, Letters, false)
    },
    row(25, Grid, false, 28_000, Descending, false),
    row(36, Grid, false, 32_000, Descending, false),
    row(49, Grid, false, 35_000, Multiples, true),
    row(49, Dispersed, false, 38_000, Multiples, true),
    row(49, Grid, false, 33_000, Primes, true),
    row(49, Dispersed, false, 36_000, Primes, true),
    row(49, Grid, false, 30_000, Fibonacci, true),
    row(49, Dispersed, false, 33_000, Fibonacci, true),
];

/// Tuned Schulte profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchulteProfile;

impl SchulteProfile {
    pub fn params(&self, level: u32) -> SchulteParams {
        LEVELS[(self.clamp_level(level) - MIN_LEVEL) as usize]
    }
}

impl GameProfile for SchulteProfile {
    fn game(&self) -> GameType {
        GameType::Schulte
    }

    fn engine(&self) -> Engine {
        Engine::Tuned
    }

    fn max_level(&self) -> u32 {
        TUNED_MAX_LEVEL
    }

    fn level_params(&self, level: u32) -> GameParams {
        GameParams::Schulte(self.params(level))
    }

    fn evaluate(
        &self,
        trial: &Trial,
        _window: &VecDeque<Trial>,
        state: &mut StaircaseState,
    ) -> Decision {
        let target = f64::from(self.params(state.level).target_time_ms);

        if trial.success {
            state.consecutive_correct += 1;
            if state.consecutive_correct >= STREAK_TO_PROMOTE
                && trial.response_time_ms.is_some_and(|rt| rt <= target)
                && state.can_promote()
            {
                return Decision::Promote(AdjustmentReason::StreakCompleted);
            }
        } else {
            state.consecutive_correct = 0;
            if state.can_demote() {
                return Decision::Demote(AdjustmentReason::Failure);
            }
        }

        if trial
            .response_time_ms
            .is_some_and(|rt| rt > target * SLOW_FACTOR)
        {
            state.consecutive_correct = 0;
            if state.can_demote() {
                return Decision::Demote(AdjustmentReason::TooSlow);
            }
        }

        Decision::Hold
    }
}
