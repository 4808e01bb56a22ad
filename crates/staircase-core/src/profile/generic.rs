//! Generic 3-up/1-down staircase shared by every game.
//!
//! Three successes in a row promote, a single failure demotes; response
//! times are ignored. Converges near 79% accuracy. Levels run 1–10 and each
//! game keeps its own simpler parameter table.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{
    Decision, GameParams, GameProfile, MemoryDigitsParams, SchulteLayout, StaircaseState,
    GENERIC_MAX_LEVEL,
};
use crate::model::{AdjustmentReason, Engine, GameType, Trial};

const STREAK_TO_PROMOTE: u32 = 3;

/// Generic-engine Schulte grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuttleParams {
    pub numbers_count: u32,
    pub layout: SchulteLayout,
    pub target_time_ms: u32,
    pub has_color_distractors: bool,
    pub is_descending: bool,
}

/// Generic-engine parity stream: one number at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParityStreamParams {
    /// Pause between consecutive stimuli.
    pub interstimulus_interval_ms: u32,
    pub has_color_distractors: bool,
    /// Inclusive range numbers are drawn from.
    pub number_range: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwinWordsParams {
    pub pairs_count: u32,
    pub exposure_time_ms: u32,
    /// Share of pairs that differ.
    pub difficulty_ratio: f64,
    /// How subtle the differences are, 1–5.
    pub subtlety_level: u32,
}

/// The 3-up/1-down staircase bound to one game's parameter table.
#[derive(Debug, Clone, Copy)]
pub struct GenericProfile {
    game: GameType,
}

impl GenericProfile {
    pub const fn new(game: GameType) -> Self {
        Self { game }
    }

    fn memory_digits(level: u32) -> MemoryDigitsParams {
        let digits_len = (3 + (level - 1) / 2).min(12);
        MemoryDigitsParams::for_level(level, digits_len)
    }

    fn shuttle(level: u32) -> ShuttleParams {
        let step = level - 1;
        ShuttleParams {
            numbers_count: (9 + (step / 2) * 2).min(35),
            layout: if level % 2 == 0 {
                SchulteLayout::Dispersed
            } else {
                SchulteLayout::Grid
            },
            target_time_ms: 30_000u32.saturating_sub(step * 2_000).max(8_000),
            has_color_distractors: level >= 7,
            is_descending: level >= 9,
        }
    }

    fn parity_stream(level: u32) -> ParityStreamParams {
        ParityStreamParams {
            interstimulus_interval_ms: 2_000u32.saturating_sub((level - 1) * 150).max(300),
            has_color_distractors: level >= 7,
            number_range: if level >= 5 { (1, 9_999) } else { (1, 999) },
        }
    }

    fn twin_words(level: u32) -> TwinWordsParams {
        let step = level - 1;
        TwinWordsParams {
            pairs_count: (8 + step / 2).min(16),
            exposure_time_ms: 20_000u32.saturating_sub(step * 1_500).max(8_000),
            difficulty_ratio: 0.5 + f64::from(step) * 0.03,
            subtlety_level: level.div_ceil(2).min(5),
        }
    }
}

impl GameProfile for GenericProfile {
    fn game(&self) -> GameType {
        self.game
    }

    fn engine(&self) -> Engine {
        Engine::Generic
    }

    fn max_level(&self) -> u32 {
        GENERIC_MAX_LEVEL
    }

    fn level_params(&self, level: u32) -> GameParams {
        let level = self.clamp_level(level);
        match self.game {
            GameType::MemoryDigits => GameParams::MemoryDigits(Self::memory_digits(level)),
            GameType::Schulte => GameParams::Shuttle(Self::shuttle(level)),
            GameType::ParImpar => GameParams::ParityStream(Self::parity_stream(level)),
            GameType::TwinWords => GameParams::TwinWords(Self::twin_words(level)),
        }
    }

    fn evaluate(
        &self,
        trial: &Trial,
        _window: &VecDeque<Trial>,
        state: &mut StaircaseState,
    ) -> Decision {
        if trial.success {
            state.consecutive_correct += 1;
        } else {
            state.consecutive_correct = 0;
        }

        if state.consecutive_correct >= STREAK_TO_PROMOTE && state.can_promote() {
            return Decision::Promote(AdjustmentReason::StreakCompleted);
        }
        if !trial.success && state.can_demote() {
            return Decision::Demote(AdjustmentReason::Failure);
        }
        Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::{state, step, trial};

    #[test]
    fn shuttle_table() {
        let p = GenericProfile::shuttle(1);
        assert_eq!(p.numbers_count, 9);
        assert_eq!(p.layout, SchulteLayout::Grid);
        assert_eq!(p.target_time_ms, 30_000);

        let p = GenericProfile::shuttle(4);
        assert_eq!(p.numbers_count, 11);
        assert_eq!(p.layout, SchulteLayout::Dispersed);
        assert_eq!(p.target_time_ms, 24_000);

        let p = GenericProfile::shuttle(10);
        assert_eq!(p.numbers_count, 17);
        assert!(p.has_color_distractors);
        assert!(p.is_descending);
        assert_eq!(p.target_time_ms, 12_000);
    }

    #[test]
    fn twin_words_table() {
        let p = GenericProfile::twin_words(1);
        assert_eq!(p.pairs_count, 8);
        assert_eq!(p.exposure_time_ms, 20_000);
        assert!((p.difficulty_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(p.subtlety_level, 1);

        let p = GenericProfile::twin_words(10);
        assert_eq!(p.pairs_count, 12);
        assert_eq!(p.exposure_time_ms, 8_000);
        assert!((p.difficulty_ratio - 0.77).abs() < 1e-9);
        assert_eq!(p.subtlety_level, 5);
    }

    #[test]
    fn parity_stream_table() {
        let p = GenericProfile::parity_stream(1);
        assert_eq!(p.interstimulus_interval_ms, 2_000);
        assert_eq!(p.number_range, (1, 999));

        let p = GenericProfile::parity_stream(10);
        assert_eq!(p.interstimulus_interval_ms, 650);
        assert_eq!(p.number_range, (1, 9_999));
        assert!(p.has_color_distractors);
    }

    #[test]
    fn generic_memory_digits() {
        let p = GenericProfile::memory_digits(1);
        assert_eq!(p.digits_len, 3);
        assert_eq!(p.exposure_time_ms, 6_000);
        let p = GenericProfile::memory_digits(10);
        assert_eq!(p.digits_len, 7);
        assert_eq!(p.exposure_time_ms, 1_100 * 7);
    }

    #[test]
    fn level_params_dispatch_by_game() {
        let schulte = GenericProfile::new(GameType::Schulte).level_params(3);
        assert!(matches!(schulte, GameParams::Shuttle(_)));
        let words = GenericProfile::new(GameType::TwinWords).level_params(99);
        assert_eq!(words, GameParams::TwinWords(GenericProfile::twin_words(10)));
    }

    #[test]
    fn three_successes_promote_without_time_gate() {
        let profile = GenericProfile::new(GameType::MemoryDigits);
        let mut window = VecDeque::new();
        let mut st = state(3, 10);
        for _ in 0..2 {
            let d = step(&profile, &mut window, &mut st, trial(3, true, Some(60_000.0)));
            assert_eq!(d, Decision::Hold);
        }
        let d = step(&profile, &mut window, &mut st, trial(3, true, Some(60_000.0)));
        assert_eq!(d, Decision::Promote(AdjustmentReason::StreakCompleted));
    }

    #[test]
    fn single_failure_demotes() {
        let profile = GenericProfile::new(GameType::TwinWords);
        let mut window = VecDeque::new();
        let mut st = state(3, 10);
        st.consecutive_correct = 2;
        let d = step(&profile, &mut window, &mut st, trial(3, false, None));
        assert_eq!(d, Decision::Demote(AdjustmentReason::Failure));
        assert_eq!(st.consecutive_correct, 0);
    }

    #[test]
    fn bounds_hold() {
        let profile = GenericProfile::new(GameType::TwinWords);
        let mut window = VecDeque::new();

        let mut bottom = state(1, 10);
        let d = step(&profile, &mut window, &mut bottom, trial(1, false, None));
        assert_eq!(d, Decision::Hold);

        let mut top = state(10, 10);
        for _ in 0..4 {
            let d = step(&profile, &mut window, &mut top, trial(10, true, None));
            assert_eq!(d, Decision::Hold);
        }
    }
}
