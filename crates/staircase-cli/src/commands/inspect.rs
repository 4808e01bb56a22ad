//! The `staircase inspect` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use staircase_core::DifficultyController;

use super::param_fields;

pub fn execute(state: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&state)
        .with_context(|| format!("failed to read snapshot: {}", state.display()))?;
    let controller = DifficultyController::from_json(&content)
        .with_context(|| format!("failed to restore snapshot: {}", state.display()))?;
    let stats = controller.stats();

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Game"), Cell::new(controller.game())]);
    table.add_row(vec![Cell::new("Engine"), Cell::new(controller.engine())]);
    table.add_row(vec![
        Cell::new("Level"),
        Cell::new(format!(
            "{} / {}",
            controller.current_level(),
            controller.max_level()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Streak"),
        Cell::new(controller.consecutive_correct()),
    ]);
    table.add_row(vec![
        Cell::new("Window"),
        Cell::new(format!(
            "{} / {}",
            stats.recent_trials,
            controller.window_size()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Recent accuracy"),
        Cell::new(format!("{:.2}", stats.recent_accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("Overall accuracy"),
        Cell::new(format!(
            "{:.2} ({}/{})",
            stats.overall_accuracy, stats.total_successes, stats.total_trials
        )),
    ]);
    table.add_row(vec![
        Cell::new("Avg RT (ms)"),
        Cell::new(stats.avg_response_time_ms),
    ]);
    println!("{table}");

    println!("\nNext round:");
    for (field, value) in param_fields(&controller.game_parameters())? {
        println!("  {field}: {value}");
    }

    Ok(())
}
