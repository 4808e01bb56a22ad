//! The `staircase params` command.

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

use staircase_core::profile::MIN_LEVEL;
use staircase_core::profile_for;

use super::{check_format, param_fields, resolve_game};

pub fn execute(
    game: String,
    engine: Option<String>,
    level: Option<u32>,
    format: String,
) -> Result<()> {
    check_format(&format)?;
    let (game, engine) = resolve_game(&game, engine.as_deref())?;
    let profile = profile_for(game, engine.unwrap_or_else(|| game.default_engine()));

    let levels: Vec<u32> = match level {
        Some(l) => {
            anyhow::ensure!(
                (MIN_LEVEL..=profile.max_level()).contains(&l),
                "level {l} outside {MIN_LEVEL}..={} for {game} ({})",
                profile.max_level(),
                profile.engine()
            );
            vec![l]
        }
        None => (MIN_LEVEL..=profile.max_level()).collect(),
    };

    if format == "json" {
        let rows: Vec<_> = levels
            .iter()
            .map(|&l| json!({ "level": l, "params": profile.level_params(l) }))
            .collect();
        let out = json!({
            "game": game,
            "engine": profile.engine(),
            "maxLevel": profile.max_level(),
            "levels": rows,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    let mut header_set = false;
    for &l in &levels {
        let fields = param_fields(&profile.level_params(l))?;
        if !header_set {
            let mut header = vec!["Level".to_string()];
            header.extend(fields.iter().map(|(k, _)| k.clone()));
            table.set_header(header);
            header_set = true;
        }
        let mut row = vec![Cell::new(l)];
        row.extend(fields.into_iter().map(|(_, v)| Cell::new(v)));
        table.add_row(row);
    }

    println!(
        "{game} ({} engine, levels {MIN_LEVEL}-{})",
        profile.engine(),
        profile.max_level()
    );
    println!("{table}");
    Ok(())
}
