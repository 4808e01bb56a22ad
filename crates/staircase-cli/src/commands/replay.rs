//! The `staircase replay` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Deserialize;
use serde_json::json;

use staircase_core::{profile_for, DifficultyController, TrialMetadata, TrialOutcome};

use super::{check_format, resolve_game};
use crate::config::load_config_from;

/// One recorded trial as written in a replay file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialInput {
    pub success: bool,
    #[serde(default, alias = "responseTimeMs")]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub mean_rt: Option<f64>,
}

impl TrialInput {
    fn metadata(&self) -> TrialMetadata {
        TrialMetadata {
            accuracy: self.accuracy,
            mean_rt: self.mean_rt,
            ..TrialMetadata::default()
        }
    }
}

pub fn load_trials(path: &Path) -> Result<Vec<TrialInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trials: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse trials: {}", path.display()))
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    game: String,
    trials: PathBuf,
    initial_level: Option<u32>,
    engine: Option<String>,
    resume: Option<PathBuf>,
    save: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    check_format(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let (game, engine) = resolve_game(&game, engine.as_deref())?;

    let mut controller = match resume {
        Some(path) => {
            anyhow::ensure!(
                initial_level.is_none(),
                "--initial-level cannot be combined with --resume"
            );
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
            let controller = DifficultyController::from_json(&content)
                .with_context(|| format!("failed to restore snapshot: {}", path.display()))?;
            anyhow::ensure!(
                controller.game() == game,
                "snapshot is for {}, not {game}",
                controller.game()
            );
            if let Some(requested) = engine {
                let effective = profile_for(game, requested).engine();
                anyhow::ensure!(
                    controller.engine() == effective,
                    "snapshot runs the {} engine, not {effective}",
                    controller.engine()
                );
            }
            tracing::info!(
                "resumed {} at level {} from {}",
                game,
                controller.current_level(),
                path.display()
            );
            controller
        }
        None => {
            let engine = engine
                .or(config.default_engine)
                .unwrap_or_else(|| game.default_engine());
            DifficultyController::with_config(
                game,
                engine,
                initial_level.unwrap_or(config.default_initial_level),
                config.controller_config(engine),
            )
        }
    };

    let inputs = load_trials(&trials)?;
    let start_level = controller.current_level();
    let outcomes: Vec<TrialOutcome> = inputs
        .iter()
        .map(|t| controller.record_trial(t.success, t.response_time, t.metadata()))
        .collect();

    if let Some(path) = &save {
        save_snapshot(&controller, path)?;
    }

    if format == "json" {
        let out = json!({
            "game": controller.game(),
            "engine": controller.engine(),
            "startLevel": start_level,
            "finalLevel": controller.current_level(),
            "outcomes": outcomes,
            "stats": controller.stats(),
            "nextParams": controller.game_parameters(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Result", "RT (ms)", "Level", "Change"]);
    for (i, (input, outcome)) in inputs.iter().zip(&outcomes).enumerate() {
        let result = if outcome.success { "OK" } else { "FAIL" };
        let rt = input
            .response_time
            .map(|rt| format!("{rt:.0}"))
            .unwrap_or_else(|| "-".to_string());
        let level = if outcome.level_changed {
            format!("{} -> {}", outcome.old_level, outcome.new_level)
        } else {
            outcome.new_level.to_string()
        };
        let change = outcome
            .reason
            .map(|r| r.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(result),
            Cell::new(rt),
            Cell::new(level),
            Cell::new(change),
        ]);
    }

    let stats = controller.stats();
    println!(
        "{} ({} engine), {} trials",
        controller.game(),
        controller.engine(),
        outcomes.len()
    );
    println!("{table}");
    println!(
        "Final level: {} (max {}), streak {}",
        controller.current_level(),
        controller.max_level(),
        stats.consecutive_correct
    );
    println!(
        "Recent accuracy: {:.0}%, overall {:.0}%, avg RT {} ms",
        stats.recent_accuracy * 100.0,
        stats.overall_accuracy * 100.0,
        stats.avg_response_time_ms
    );
    if let Some(path) = &save {
        println!("Saved state to {}", path.display());
    }

    Ok(())
}

fn save_snapshot(controller: &DifficultyController, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&controller.to_snapshot())?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
    tracing::debug!("wrote snapshot to {}", path.display());
    Ok(())
}
