pub mod init;
pub mod inspect;
pub mod params;
pub mod replay;

use anyhow::{Context, Result};
use staircase_core::{Engine, GameParams, GameType};

/// Parse a game key and an optional engine name.
pub(crate) fn resolve_game(
    game: &str,
    engine: Option<&str>,
) -> Result<(GameType, Option<Engine>)> {
    let game: GameType = game.parse()?;
    let engine = engine
        .map(|e| e.parse::<Engine>())
        .transpose()
        .context("invalid --engine")?;
    Ok((game, engine))
}

/// Flatten a parameter set into `(field, value)` pairs, dropping the `kind` tag.
pub(crate) fn param_fields(params: &GameParams) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params)?;
    let fields = value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(k, _)| k.as_str() != "kind")
                .map(|(k, v)| (k.clone(), display_value(v)))
                .collect()
        })
        .unwrap_or_default();
    Ok(fields)
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join("-"),
        other => other.to_string(),
    }
}

pub(crate) fn check_format(format: &str) -> Result<()> {
    anyhow::ensure!(
        matches!(format, "text" | "json"),
        "unknown format '{format}' (expected text or json)"
    );
    Ok(())
}
