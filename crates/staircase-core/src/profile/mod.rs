//! Game profiles: level → parameter tables and the staircase rule per game.
//!
//! Each profile is a stateless unit value. The controller owns all mutable
//! state and hands the profile a [`StaircaseState`] to update on every trial.
//! Adding a game means adding a [`GameType`] variant, a profile type, and an
//! arm in [`profile_for`].

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AdjustmentReason, Engine, GameType, Trial};

mod generic;
mod memory_digits;
mod par_impar;
mod schulte;

pub use generic::{GenericProfile, ParityStreamParams, ShuttleParams, TwinWordsParams};
pub use memory_digits::{MemoryDigitsParams, MemoryDigitsProfile};
pub use par_impar::{ParImparParams, ParImparProfile};
pub use schulte::{SchulteLayout, SchulteMode, SchulteParams, SchulteProfile};

/// Highest level of the tuned per-game profiles.
pub const TUNED_MAX_LEVEL: u32 = 20;
/// Highest level of the generic staircase.
pub const GENERIC_MAX_LEVEL: u32 = 10;
/// Lowest level of every profile.
pub const MIN_LEVEL: u32 = 1;

/// Mutable staircase state a profile may update while evaluating a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaircaseState {
    pub level: u32,
    pub max_level: u32,
    pub consecutive_correct: u32,
}

impl StaircaseState {
    pub fn can_promote(&self) -> bool {
        self.level < self.max_level
    }

    pub fn can_demote(&self) -> bool {
        self.level > MIN_LEVEL
    }
}

/// Level adjustment requested by a profile for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hold,
    Promote(AdjustmentReason),
    Demote(AdjustmentReason),
}

/// Per-game difficulty profile.
pub trait GameProfile: fmt::Debug + Send + Sync {
    /// Game this profile drives.
    fn game(&self) -> GameType;

    /// Engine family the profile belongs to.
    fn engine(&self) -> Engine;

    /// Highest reachable level.
    fn max_level(&self) -> u32;

    /// Generation parameters for a level. Out-of-range levels are clamped.
    fn level_params(&self, level: u32) -> GameParams;

    /// Apply the staircase rule to a freshly recorded trial.
    ///
    /// `window` already contains `trial` as its newest element. Implementations
    /// update `state.consecutive_correct` and only request a promotion or
    /// demotion that stays within `[MIN_LEVEL, state.max_level]`.
    fn evaluate(
        &self,
        trial: &Trial,
        window: &VecDeque<Trial>,
        state: &mut StaircaseState,
    ) -> Decision;

    /// Clamp a level into this profile's range.
    fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(MIN_LEVEL, self.max_level())
    }
}

/// Generation parameters handed to the UI for the next round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameParams {
    MemoryDigits(MemoryDigitsParams),
    Schulte(SchulteParams),
    ParImpar(ParImparParams),
    /// Generic-engine Schulte grid.
    Shuttle(ShuttleParams),
    /// Generic-engine parity stream.
    ParityStream(ParityStreamParams),
    TwinWords(TwinWordsParams),
}

static MEMORY_DIGITS: MemoryDigitsProfile = MemoryDigitsProfile;
static SCHULTE: SchulteProfile = SchulteProfile;
static PAR_IMPAR: ParImparProfile = ParImparProfile;
static GENERIC_MEMORY_DIGITS: GenericProfile = GenericProfile::new(GameType::MemoryDigits);
static GENERIC_SCHULTE: GenericProfile = GenericProfile::new(GameType::Schulte);
static GENERIC_PAR_IMPAR: GenericProfile = GenericProfile::new(GameType::ParImpar);
static GENERIC_TWIN_WORDS: GenericProfile = GenericProfile::new(GameType::TwinWords);

/// Resolve the profile for a game under an engine.
///
/// Games without a tuned profile run the generic staircase under either engine.
pub fn profile_for(game: GameType, engine: Engine) -> &'static dyn GameProfile {
    match (game, engine) {
        (GameType::MemoryDigits, Engine::Tuned) => &MEMORY_DIGITS,
        (GameType::Schulte, Engine::Tuned) => &SCHULTE,
        (GameType::ParImpar, Engine::Tuned) => &PAR_IMPAR,
        (GameType::MemoryDigits, Engine::Generic) => &GENERIC_MEMORY_DIGITS,
        (GameType::Schulte, Engine::Generic) => &GENERIC_SCHULTE,
        (GameType::ParImpar, Engine::Generic) => &GENERIC_PAR_IMPAR,
        (GameType::TwinWords, _) => &GENERIC_TWIN_WORDS,
    }
}
