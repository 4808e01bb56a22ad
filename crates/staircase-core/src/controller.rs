//! The adaptive difficulty controller.
//!
//! One controller belongs to one game session. The caller records every
//! completed trial in order and asks for the next round's parameters; the
//! controller applies the game's staircase rule and moves the level by at
//! most one step per trial.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::StaircaseError;
use crate::model::{Engine, GameType, Trial, TrialMetadata, TrialOutcome};
use crate::profile::{profile_for, Decision, GameParams, GameProfile, StaircaseState, MIN_LEVEL};
use crate::snapshot::{ControllerSnapshot, DEFAULT_WINDOW_SIZE};
use crate::statistics::Stats;

/// Tunables that are not part of a game profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Trials kept for rolling statistics. Values below 1 are raised to 1.
    pub window_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Closed-loop difficulty controller for a single game session.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    game: GameType,
    profile: &'static dyn GameProfile,
    window_size: usize,
    current_level: u32,
    consecutive_correct: u32,
    recent_trials: VecDeque<Trial>,
    total_trials: u64,
    total_successes: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl DifficultyController {
    /// Controller on the game's default engine.
    pub fn new(game: GameType, initial_level: u32) -> Self {
        Self::with_engine(game, game.default_engine(), initial_level)
    }

    /// Controller on an explicit engine.
    pub fn with_engine(game: GameType, engine: Engine, initial_level: u32) -> Self {
        Self::with_config(game, engine, initial_level, ControllerConfig::default())
    }

    pub fn with_config(
        game: GameType,
        engine: Engine,
        initial_level: u32,
        config: ControllerConfig,
    ) -> Self {
        let profile = profile_for(game, engine);
        let window_size = config.window_size.max(1);
        Self {
            game,
            profile,
            window_size,
            current_level: profile.clamp_level(initial_level),
            consecutive_correct: 0,
            recent_trials: VecDeque::with_capacity(window_size + 1),
            total_trials: 0,
            total_successes: 0,
            last_timestamp: None,
        }
    }

    /// Build from a game key such as `"schulte_table"`; unknown keys are rejected.
    pub fn from_key(key: &str, initial_level: u32) -> Result<Self, StaircaseError> {
        Ok(Self::new(key.parse()?, initial_level))
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    /// Engine actually in use; games without a tuned profile report `Generic`.
    pub fn engine(&self) -> Engine {
        self.profile.engine()
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn max_level(&self) -> u32 {
        self.profile.max_level()
    }

    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Trials in the window, oldest first.
    pub fn recent_trials(&self) -> &VecDeque<Trial> {
        &self.recent_trials
    }

    /// Record a completed trial now.
    pub fn record_trial(
        &mut self,
        success: bool,
        response_time_ms: Option<f64>,
        metadata: TrialMetadata,
    ) -> TrialOutcome {
        self.record_trial_at(success, response_time_ms, metadata, Utc::now())
    }

    /// Record a completed trial with an explicit timestamp.
    ///
    /// A timestamp earlier than the previous trial's is raised to it, so
    /// timestamps never go backwards within a session, across `set_level`
    /// included.
    pub fn record_trial_at(
        &mut self,
        success: bool,
        response_time_ms: Option<f64>,
        metadata: TrialMetadata,
        timestamp: DateTime<Utc>,
    ) -> TrialOutcome {
        let timestamp = match self.last_timestamp {
            Some(last) if last > timestamp => last,
            _ => timestamp,
        };
        self.last_timestamp = Some(timestamp);
        let trial = Trial {
            success,
            response_time_ms: response_time_ms.filter(|rt| rt.is_finite() && *rt >= 0.0),
            metadata,
            level: self.current_level,
            timestamp,
        };

        self.total_trials += 1;
        if success {
            self.total_successes += 1;
        }
        self.recent_trials.push_back(trial.clone());
        while self.recent_trials.len() > self.window_size {
            self.recent_trials.pop_front();
        }

        let old_level = self.current_level;
        let max_level = self.profile.max_level();
        let mut state = StaircaseState {
            level: old_level,
            max_level,
            consecutive_correct: self.consecutive_correct,
        };
        let decision = self.profile.evaluate(&trial, &self.recent_trials, &mut state);
        self.consecutive_correct = state.consecutive_correct;

        let reason = match decision {
            Decision::Promote(reason) => {
                self.current_level = (old_level + 1).min(max_level);
                Some(reason)
            }
            Decision::Demote(reason) => {
                self.current_level = old_level.saturating_sub(1).max(MIN_LEVEL);
                Some(reason)
            }
            Decision::Hold => None,
        };

        let level_changed = self.current_level != old_level;
        if level_changed {
            self.consecutive_correct = 0;
            if let Some(reason) = reason {
                tracing::info!(
                    "{} level {} -> {} ({})",
                    self.game,
                    old_level,
                    self.current_level,
                    reason
                );
            }
        }
        tracing::debug!(
            "{} trial recorded: success={} rt={:?} level={} streak={}",
            self.game,
            success,
            trial.response_time_ms,
            self.current_level,
            self.consecutive_correct
        );

        TrialOutcome {
            success,
            old_level,
            new_level: self.current_level,
            level_changed,
            reason: reason.filter(|_| level_changed),
            consecutive_correct: self.consecutive_correct,
            stats: self.stats(),
        }
    }

    /// Parameters for the next round at the current level.
    pub fn game_parameters(&self) -> GameParams {
        self.profile.level_params(self.current_level)
    }

    /// Rolling statistics over the window plus lifetime counters.
    pub fn stats(&self) -> Stats {
        Stats::compute(
            &self.recent_trials,
            self.current_level,
            self.consecutive_correct,
            self.total_trials,
            self.total_successes,
        )
    }

    /// Jump to a level, discarding the streak and the window.
    pub fn set_level(&mut self, level: u32) {
        self.current_level = self.profile.clamp_level(level);
        self.consecutive_correct = 0;
        self.recent_trials.clear();
        tracing::info!("{} level set to {}", self.game, self.current_level);
    }

    /// Capture the full controller state for persistence.
    pub fn to_snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            game_type: self.game,
            engine: self.engine(),
            current_level: self.current_level,
            consecutive_correct: self.consecutive_correct,
            total_trials: self.total_trials,
            total_successes: self.total_successes,
            window_size: self.window_size,
            recent_trials: self.recent_trials.iter().cloned().collect(),
            last_timestamp: self.last_timestamp,
        }
    }

    /// Rebuild a controller with exactly the stored state.
    pub fn from_snapshot(snapshot: ControllerSnapshot) -> Result<Self, StaircaseError> {
        let profile = profile_for(snapshot.game_type, snapshot.engine);
        let max_level = profile.max_level();

        if !(MIN_LEVEL..=max_level).contains(&snapshot.current_level) {
            return Err(StaircaseError::InvalidSnapshot(format!(
                "level {} outside {}..={} for {} ({})",
                snapshot.current_level,
                MIN_LEVEL,
                max_level,
                snapshot.game_type,
                profile.engine()
            )));
        }
        if snapshot.window_size == 0 {
            return Err(StaircaseError::InvalidSnapshot(
                "window size must be at least 1".into(),
            ));
        }
        if snapshot.recent_trials.len() > snapshot.window_size {
            return Err(StaircaseError::InvalidSnapshot(format!(
                "{} trials exceed window size {}",
                snapshot.recent_trials.len(),
                snapshot.window_size
            )));
        }
        if snapshot.total_successes > snapshot.total_trials {
            return Err(StaircaseError::InvalidSnapshot(format!(
                "{} successes exceed {} trials",
                snapshot.total_successes, snapshot.total_trials
            )));
        }

        let window_last = snapshot.recent_trials.last().map(|t| t.timestamp);
        let last_timestamp = snapshot.last_timestamp.max(window_last);

        Ok(Self {
            game: snapshot.game_type,
            profile,
            window_size: snapshot.window_size,
            current_level: snapshot.current_level,
            consecutive_correct: snapshot.consecutive_correct,
            recent_trials: snapshot.recent_trials.into(),
            total_trials: snapshot.total_trials,
            total_successes: snapshot.total_successes,
            last_timestamp,
        })
    }

    pub fn to_json(&self) -> Result<String, StaircaseError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, StaircaseError> {
        let snapshot: ControllerSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdjustmentReason;
    use crate::profile::{SchulteLayout, TUNED_MAX_LEVEL};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn none() -> TrialMetadata {
        TrialMetadata::default()
    }

    #[test]
    fn initial_level_is_clamped() {
        assert_eq!(DifficultyController::new(GameType::Schulte, 0).current_level(), 1);
        assert_eq!(
            DifficultyController::new(GameType::Schulte, 40).current_level(),
            20
        );
        assert_eq!(
            DifficultyController::new(GameType::TwinWords, 40).current_level(),
            10
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = DifficultyController::from_key("rsvp", 1).unwrap_err();
        assert!(matches!(err, StaircaseError::UnknownGameType(_)));
        let ok = DifficultyController::from_key("schulte_table", 3).unwrap();
        assert_eq!(ok.game(), GameType::Schulte);
    }

    #[test]
    fn memory_digits_promotes_then_demotes() {
        let mut c = DifficultyController::new(GameType::MemoryDigits, 1);
        let first = c.record_trial(true, Some(3000.0), none());
        assert!(!first.level_changed);
        c.record_trial(true, Some(3200.0), none());
        let third = c.record_trial(true, Some(3100.0), none());
        assert!(third.promoted());
        assert_eq!(third.new_level, 2);
        assert_eq!(third.reason, Some(AdjustmentReason::StreakCompleted));
        assert_eq!(c.consecutive_correct(), 0);

        let fail = c.record_trial(false, Some(2000.0), none());
        assert!(fail.demoted());
        assert_eq!(fail.old_level, 2);
        assert_eq!(fail.new_level, 1);
        assert_eq!(fail.reason, Some(AdjustmentReason::Failure));
        assert_eq!(c.consecutive_correct(), 0);
    }

    #[test]
    fn schulte_promotes_to_dispersed_grid() {
        let mut c = DifficultyController::new(GameType::Schulte, 1);
        c.record_trial(true, Some(10_000.0), none());
        let outcome = c.record_trial(true, Some(12_000.0), none());
        assert_eq!(outcome.new_level, 2);
        match c.game_parameters() {
            GameParams::Schulte(p) => {
                assert_eq!(p.n, 9);
                assert_eq!(p.layout, SchulteLayout::Dispersed);
            }
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn par_impar_streak_then_bad_round() {
        let mut c = DifficultyController::new(GameType::ParImpar, 5);
        for _ in 0..2 {
            c.record_trial(true, None, TrialMetadata::round(0.9, 700.0));
        }
        let promoted = c.record_trial(true, None, TrialMetadata::round(0.9, 700.0));
        assert_eq!(promoted.new_level, 6);

        let demoted = c.record_trial(false, None, TrialMetadata::round(0.5, 900.0));
        assert_eq!(demoted.new_level, 5);
        assert_eq!(demoted.reason, Some(AdjustmentReason::LowAccuracy));
    }

    #[test]
    fn par_impar_accurate_but_slow_round_demotes() {
        let mut c = DifficultyController::new(GameType::ParImpar, 5);
        // level 5 goal is 850ms
        let outcome = c.record_trial(true, None, TrialMetadata::round(0.9, 2000.0));
        assert_eq!(outcome.new_level, 4);
        assert_eq!(outcome.reason, Some(AdjustmentReason::TooSlow));
        assert_eq!(c.consecutive_correct(), 0);
    }

    #[test]
    fn par_impar_round_without_metadata_demotes() {
        let mut c = DifficultyController::new(GameType::ParImpar, 5);
        let outcome = c.record_trial(false, None, none());
        assert_eq!(outcome.new_level, 4);
        assert_eq!(outcome.reason, Some(AdjustmentReason::LowAccuracy));
    }

    #[test]
    fn schulte_time_limit_overrides_success() {
        let mut c = DifficultyController::new(GameType::Schulte, 3);
        // level 3 target is 20s
        let outcome = c.record_trial(true, Some(20_000.0 * 1.6), none());
        assert!(outcome.demoted());
        assert_eq!(outcome.reason, Some(AdjustmentReason::TooSlow));
        assert!(outcome.success);
    }

    #[test]
    fn fresh_controller_stats_are_zero() {
        let c = DifficultyController::new(GameType::MemoryDigits, 1);
        let stats = c.stats();
        assert_eq!(stats.recent_accuracy, 0.0);
        assert_eq!(stats.overall_accuracy, 0.0);
        assert_eq!(stats.avg_response_time_ms, 0.0);
        assert_eq!(stats.total_trials, 0);
    }

    #[test]
    fn bounds_at_extremes() {
        let mut bottom = DifficultyController::new(GameType::Schulte, 1);
        let outcome = bottom.record_trial(false, None, none());
        assert!(!outcome.level_changed);
        assert_eq!(outcome.reason, None);
        assert_eq!(bottom.current_level(), 1);

        let mut top = DifficultyController::new(GameType::Schulte, TUNED_MAX_LEVEL);
        for _ in 0..6 {
            top.record_trial(true, Some(1_000.0), none());
        }
        assert_eq!(top.current_level(), TUNED_MAX_LEVEL);
    }

    #[test]
    fn window_evicts_oldest_first() {
        let config = ControllerConfig { window_size: 3 };
        let mut c =
            DifficultyController::with_config(GameType::TwinWords, Engine::Generic, 5, config);
        for rt in [1.0, 2.0, 3.0, 4.0, 5.0] {
            c.record_trial(false, Some(rt), none());
        }
        let times: Vec<f64> = c
            .recent_trials()
            .iter()
            .filter_map(|t| t.response_time_ms)
            .collect();
        assert_eq!(times, vec![3.0, 4.0, 5.0]);
        assert_eq!(c.stats().total_trials, 5);
    }

    #[test]
    fn trial_snapshots_level_before_adjustment() {
        let mut c = DifficultyController::new(GameType::Schulte, 4);
        c.record_trial(false, Some(5_000.0), none());
        assert_eq!(c.recent_trials().back().unwrap().level, 4);
        assert_eq!(c.current_level(), 3);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let mut c = DifficultyController::new(GameType::MemoryDigits, 1);
        let later = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        c.record_trial_at(true, None, none(), later);
        c.record_trial_at(true, None, none(), earlier);
        let stamps: Vec<_> = c.recent_trials().iter().map(|t| t.timestamp).collect();
        assert_eq!(stamps, vec![later, later]);
    }

    #[test]
    fn timestamps_stay_monotonic_across_set_level() {
        let mut c = DifficultyController::new(GameType::MemoryDigits, 1);
        let later = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        c.record_trial_at(true, None, none(), later);
        c.set_level(5);
        c.record_trial_at(true, None, none(), earlier);
        assert_eq!(c.recent_trials()[0].timestamp, later);

        // The session clock survives a snapshot taken with an empty window.
        c.set_level(3);
        let mut restored = DifficultyController::from_json(&c.to_json().unwrap()).unwrap();
        restored.record_trial_at(true, None, none(), earlier);
        assert_eq!(restored.recent_trials()[0].timestamp, later);
    }

    #[test]
    fn negative_response_time_is_dropped() {
        let mut c = DifficultyController::new(GameType::Schulte, 2);
        c.record_trial(true, Some(-5.0), none());
        c.record_trial(true, Some(f64::NAN), none());
        assert!(c.recent_trials().iter().all(|t| t.response_time_ms.is_none()));
        assert_eq!(c.current_level(), 2);
    }

    #[test]
    fn set_level_resets_streak_and_window() {
        let mut c = DifficultyController::new(GameType::MemoryDigits, 1);
        c.record_trial(true, Some(3000.0), none());
        c.set_level(25);
        assert_eq!(c.current_level(), 20);
        assert_eq!(c.consecutive_correct(), 0);
        assert!(c.recent_trials().is_empty());
        assert_eq!(c.stats().total_trials, 1);
    }

    #[test]
    fn twin_words_runs_generic_engine() {
        let mut c = DifficultyController::new(GameType::TwinWords, 3);
        assert_eq!(c.engine(), Engine::Generic);
        assert_eq!(c.max_level(), 10);
        for _ in 0..3 {
            c.record_trial(true, None, none());
        }
        assert_eq!(c.current_level(), 4);
    }

    #[test]
    fn snapshot_roundtrip_is_exact() {
        let mut c = DifficultyController::new(GameType::ParImpar, 7);
        c.record_trial(true, None, TrialMetadata::round(0.9, 650.0));
        c.record_trial(true, None, TrialMetadata::round(0.7, 650.0));

        let json = c.to_json().unwrap();
        let restored = DifficultyController::from_json(&json).unwrap();
        assert_eq!(restored.to_snapshot(), c.to_snapshot());
        assert_eq!(restored.stats(), c.stats());
        assert_eq!(restored.game_parameters(), c.game_parameters());
    }

    #[test]
    fn restored_controller_behaves_identically() {
        let mut original = DifficultyController::new(GameType::MemoryDigits, 4);
        original.record_trial(true, Some(3000.0), none());
        original.record_trial(true, Some(3100.0), none());
        let mut restored = DifficultyController::from_snapshot(original.to_snapshot()).unwrap();

        let a = original.record_trial(true, Some(3200.0), none());
        let b = restored.record_trial(true, Some(3200.0), none());
        assert_eq!(a.new_level, b.new_level);
        assert_eq!(a.reason, b.reason);
        assert_eq!(a.consecutive_correct, b.consecutive_correct);
    }

    #[test]
    fn snapshot_with_bad_level_is_rejected() {
        let mut snap = DifficultyController::new(GameType::TwinWords, 1).to_snapshot();
        snap.current_level = 11;
        let err = DifficultyController::from_snapshot(snap).unwrap_err();
        assert!(matches!(err, StaircaseError::InvalidSnapshot(_)));
    }

    #[test]
    fn snapshot_with_overfull_window_is_rejected() {
        let mut c = DifficultyController::new(GameType::Schulte, 1);
        for _ in 0..4 {
            c.record_trial(true, Some(30_000.0), none());
        }
        let mut snap = c.to_snapshot();
        snap.window_size = 2;
        assert!(DifficultyController::from_snapshot(snap).is_err());
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = DifficultyController::from_json("{not json").unwrap_err();
        assert!(matches!(err, StaircaseError::Serialization(_)));
    }

    fn game_strategy() -> impl Strategy<Value = (GameType, Engine)> {
        prop::sample::select(vec![
            (GameType::MemoryDigits, Engine::Tuned),
            (GameType::Schulte, Engine::Tuned),
            (GameType::ParImpar, Engine::Tuned),
            (GameType::MemoryDigits, Engine::Generic),
            (GameType::Schulte, Engine::Generic),
            (GameType::ParImpar, Engine::Generic),
            (GameType::TwinWords, Engine::Generic),
        ])
    }

    fn trial_strategy() -> impl Strategy<Value = (bool, Option<f64>, Option<f64>, Option<f64>)> {
        (
            any::<bool>(),
            prop::option::of(0.0f64..60_000.0),
            prop::option::of(0.0f64..=1.0),
            prop::option::of(200.0f64..2_000.0),
        )
    }

    proptest! {
        #[test]
        fn prop_level_window_and_streak_invariants(
            (game, engine) in game_strategy(),
            initial in 0u32..30,
            trials in prop::collection::vec(trial_strategy(), 0..80),
        ) {
            let mut c = DifficultyController::with_engine(game, engine, initial);
            let max = c.max_level();
            for (success, rt, accuracy, mean_rt) in trials {
                let metadata = TrialMetadata { accuracy, mean_rt, ..TrialMetadata::default() };
                let before = c.current_level();
                let outcome = c.record_trial(success, rt, metadata);

                prop_assert!((1..=max).contains(&c.current_level()));
                prop_assert!(c.recent_trials().len() <= c.window_size());
                prop_assert!(before.abs_diff(c.current_level()) <= 1);
                prop_assert_eq!(outcome.level_changed, before != c.current_level());
                if outcome.level_changed {
                    prop_assert_eq!(c.consecutive_correct(), 0);
                    prop_assert!(outcome.reason.is_some());
                }
            }
        }

        #[test]
        fn prop_parameters_are_pure(
            (game, engine) in game_strategy(),
            level in 0u32..30,
        ) {
            let c = DifficultyController::with_engine(game, engine, level);
            prop_assert_eq!(c.game_parameters(), c.game_parameters());
        }

        #[test]
        fn prop_snapshot_roundtrip(
            (game, engine) in game_strategy(),
            trials in prop::collection::vec(trial_strategy(), 0..30),
        ) {
            let mut c = DifficultyController::with_engine(game, engine, 3);
            for (success, rt, accuracy, mean_rt) in trials {
                let metadata = TrialMetadata { accuracy, mean_rt, ..TrialMetadata::default() };
                c.record_trial(success, rt, metadata);
            }
            let restored = DifficultyController::from_json(&c.to_json().unwrap()).unwrap();
            prop_assert_eq!(restored.to_snapshot(), c.to_snapshot());
        }
    }
}
