//! Core data model types for staircase.
//!
//! Game identities, engine selection, and the trial records a controller
//! keeps in its rolling window.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StaircaseError;
use crate::statistics::Stats;

/// A training game with its own difficulty trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Digit-span memory: recall a sequence of digits after exposure.
    MemoryDigits,
    /// Schulte table: locate cells in order as fast as possible.
    Schulte,
    /// Parity classification over rounds of multi-digit numbers.
    ParImpar,
    /// Spot the differing word pairs in a grid.
    TwinWords,
}

impl GameType {
    /// Every known game, in display order.
    pub const ALL: [GameType; 4] = [
        GameType::MemoryDigits,
        GameType::Schulte,
        GameType::ParImpar,
        GameType::TwinWords,
    ];

    /// The engine used when the caller does not pick one.
    ///
    /// Games without a tuned profile run on the generic staircase.
    pub fn default_engine(self) -> Engine {
        match self {
            GameType::MemoryDigits | GameType::Schulte | GameType::ParImpar => Engine::Tuned,
            GameType::TwinWords => Engine::Generic,
        }
    }

    /// Canonical snake_case key used in persisted state.
    pub fn key(self) -> &'static str {
        match self {
            GameType::MemoryDigits => "memory_digits",
            GameType::Schulte => "schulte",
            GameType::ParImpar => "par_impar",
            GameType::TwinWords => "twin_words",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GameType {
    type Err = StaircaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory_digits" | "memorydigits" => Ok(GameType::MemoryDigits),
            "schulte" | "schulte_table" | "shuttle" => Ok(GameType::Schulte),
            "par_impar" | "parimpar" => Ok(GameType::ParImpar),
            "twin_words" | "twinwords" => Ok(GameType::TwinWords),
            other => Err(StaircaseError::UnknownGameType(other.to_string())),
        }
    }
}

/// Which staircase family drives a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Per-game rules with response-time and accuracy gates, levels 1–20.
    Tuned,
    /// Plain 3-up/1-down staircase, levels 1–10.
    Generic,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Tuned => write!(f, "tuned"),
            Engine::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for Engine {
    type Err = StaircaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tuned" | "enhanced" => Ok(Engine::Tuned),
            "generic" | "legacy" => Ok(Engine::Generic),
            other => Err(StaircaseError::UnknownEngine(other.to_string())),
        }
    }
}

/// Game-specific round data supplied by the caller alongside a trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialMetadata {
    /// Fraction of items answered correctly in a multi-item round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Mean per-item response time in milliseconds for the round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_rt: Option<f64>,
    /// Any other fields the caller attached; kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrialMetadata {
    /// Metadata for a multi-item round.
    pub fn round(accuracy: f64, mean_rt: f64) -> Self {
        Self {
            accuracy: Some(accuracy),
            mean_rt: Some(mean_rt),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accuracy.is_none() && self.mean_rt.is_none() && self.extra.is_empty()
    }
}

/// One completed round, snapshotted at the level it was played on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub success: bool,
    /// Response time in milliseconds, if the game measures one.
    #[serde(default)]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub metadata: TrialMetadata,
    /// Level in effect when the trial was played.
    pub level: u32,
    pub timestamp: DateTime<Utc>,
}

/// Why a trial moved the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Enough qualifying successes in a row.
    StreakCompleted,
    /// The trial was failed.
    Failure,
    /// Response time went past the game's demotion limit.
    TooSlow,
    /// Round accuracy fell below the demotion floor.
    LowAccuracy,
}

impl fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentReason::StreakCompleted => write!(f, "performance improved"),
            AdjustmentReason::Failure => write!(f, "trial failed"),
            AdjustmentReason::TooSlow => write!(f, "response too slow"),
            AdjustmentReason::LowAccuracy => write!(f, "accuracy too low"),
        }
    }
}

/// What `record_trial` reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub success: bool,
    pub old_level: u32,
    pub new_level: u32,
    pub level_changed: bool,
    /// Set only when the level changed.
    pub reason: Option<AdjustmentReason>,
    pub consecutive_correct: u32,
    pub stats: Stats,
}

impl TrialOutcome {
    pub fn promoted(&self) -> bool {
        self.new_level > self.old_level
    }

    pub fn demoted(&self) -> bool {
        self.new_level < self.old_level
    }
}
