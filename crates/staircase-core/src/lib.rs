//! staircase-core — Adaptive difficulty controllers for cognitive-training games.
//!
//! A [`DifficultyController`] tracks one game session's difficulty level and
//! moves it up or down after each trial according to the game's staircase
//! rule. Game profiles map levels to concrete round parameters, and
//! snapshots carry controller state to and from the persistence layer.

pub mod controller;
pub mod error;
pub mod model;
pub mod profile;
pub mod snapshot;
pub mod statistics;

pub use controller::{ControllerConfig, DifficultyController};
pub use error::StaircaseError;
pub use model::{AdjustmentReason, Engine, GameType, Trial, TrialMetadata, TrialOutcome};
pub use profile::{profile_for, GameParams, GameProfile};
pub use snapshot::ControllerSnapshot;
pub use statistics::Stats;
