//! The `staircase init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("staircase.toml").exists() {
        println!("staircase.toml already exists, skipping.");
    } else {
        std::fs::write("staircase.toml", SAMPLE_CONFIG)?;
        println!("Created staircase.toml");
    }

    let example_path = std::path::Path::new("trials.example.json");
    if example_path.exists() {
        println!("trials.example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TRIALS)?;
        println!("Created trials.example.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: staircase params --game memory_digits");
    println!("  2. Run: staircase replay --game memory_digits --trials trials.example.json --save state.json");
    println!("  3. Run: staircase inspect --state state.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# staircase configuration

# Trials kept for rolling statistics
window_size = 10
generic_window_size = 10

# Level used when --initial-level is not given
default_initial_level = 1

# Uncomment to force an engine for every game ("tuned" or "generic")
# default_engine = "generic"
"#;

const EXAMPLE_TRIALS: &str = r#"[
  { "success": true, "responseTime": 3200 },
  { "success": true, "responseTime": 3300 },
  { "success": true, "responseTime": 3400 },
  { "success": true, "responseTime": 3500 },
  { "success": false, "responseTime": 4100 },
  { "success": true, "responseTime": 5200 }
]
"#;
