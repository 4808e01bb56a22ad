//! Persisted controller state.
//!
//! The persistence layer stores this structure verbatim, keyed by user and
//! game, and hands it back on resume. Field names are camelCase so stored
//! records keep the shape the web client already writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Engine, GameType, Trial};

/// Window length used when a stored record does not carry one.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Complete, directly storable controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub game_type: GameType,
    /// Records written before engines were distinguished came from the
    /// generic staircase.
    #[serde(default = "default_engine")]
    pub engine: Engine,
    pub current_level: u32,
    #[serde(default, alias = "consecutiveSuccesses")]
    pub consecutive_correct: u32,
    #[serde(default)]
    pub total_trials: u64,
    #[serde(default)]
    pub total_successes: u64,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Oldest first.
    #[serde(default)]
    pub recent_trials: Vec<Trial>,
    /// Latest trial timestamp of the session, kept after the window is cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
}

fn default_engine() -> Engine {
    Engine::Generic
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
