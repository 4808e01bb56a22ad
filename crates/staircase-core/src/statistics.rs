//! Rolling performance statistics over a controller's trial window.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::Trial;

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `num / den`, or 0 when there is nothing to divide by.
pub fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Fraction of successful trials in the window (unrounded).
pub fn recent_accuracy(window: &VecDeque<Trial>) -> f64 {
    let successes = window.iter().filter(|t| t.success).count() as u64;
    ratio(successes, window.len() as u64)
}

/// Mean of the response times that were actually recorded in the window.
pub fn mean_response_time(window: &VecDeque<Trial>) -> Option<f64> {
    mean(window.iter().filter_map(|t| t.response_time_ms))
}

/// Mean response time of the last `n` successful trials in the window.
///
/// Returns `None` when fewer than `n` successes are present or any of them
/// lacks a response time.
pub fn mean_recent_success_rt(window: &VecDeque<Trial>, n: usize) -> Option<f64> {
    let recent: Vec<Option<f64>> = window
        .iter()
        .rev()
        .filter(|t| t.success)
        .take(n)
        .map(|t| t.response_time_ms)
        .collect();
    if n == 0 || recent.len() < n {
        return None;
    }
    let times: Option<Vec<f64>> = recent.into_iter().collect();
    times.and_then(mean)
}

/// Snapshot of a controller's performance for display and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub current_level: u32,
    pub consecutive_correct: u32,
    /// Trials currently held in the window.
    pub recent_trials: usize,
    /// Lifetime counters; informational only.
    pub total_trials: u64,
    pub total_successes: u64,
    /// Successes / window length, two decimals.
    pub recent_accuracy: f64,
    /// Lifetime successes / lifetime trials, two decimals.
    pub overall_accuracy: f64,
    /// Mean recorded response time in the window, nearest millisecond.
    pub avg_response_time_ms: f64,
}

impl Stats {
    /// Compute statistics from a window and the lifetime counters.
    pub fn compute(
        window: &VecDeque<Trial>,
        current_level: u32,
        consecutive_correct: u32,
        total_trials: u64,
        total_successes: u64,
    ) -> Self {
        Self {
            current_level,
            consecutive_correct,
            recent_trials: window.len(),
            total_trials,
            total_successes,
            recent_accuracy: round2(recent_accuracy(window)),
            overall_accuracy: round2(ratio(total_successes, total_trials)),
            avg_response_time_ms: mean_response_time(window).unwrap_or(0.0).round(),
        }
    }
}
