//! Writes TypeScript bindings and JSON schemas for the view model.
//!
//! Usage: `cargo run --bin generate_types [OUTPUT_DIR]` (defaults to `bindings`)

use anyhow::{Context, Result};
use schemars::schema_for;
use std::path::{Path, PathBuf};
use ts_rs::TS;

use multistep::config::{Config, TabStyle};
use multistep::steps::{ConfigEcho, StepKey, StepView, ViewModel};

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  wrote {}", path.display());
    Ok(())
}

fn typescript<T: TS + 'static>(dir: &Path) -> Result<()> {
    let source = T::export_to_string()
        .with_context(|| format!("Failed to export TypeScript for {}", T::name()))?;
    write(dir, &format!("{}.ts", T::name()), &source)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bindings"));
    std::fs::create_dir_all(&out_dir).context("Failed to create output directory")?;

    println!("Generating TypeScript bindings in {}", out_dir.display());
    typescript::<StepKey>(&out_dir)?;
    typescript::<TabStyle>(&out_dir)?;
    typescript::<StepView>(&out_dir)?;
    typescript::<ConfigEcho>(&out_dir)?;
    typescript::<ViewModel>(&out_dir)?;

    println!("Generating JSON schemas in {}", out_dir.display());
    let view_schema = serde_json::to_string_pretty(&schema_for!(ViewModel))?;
    write(&out_dir, "view-model.schema.json", &view_schema)?;
    let config_schema = serde_json::to_string_pretty(&schema_for!(Config))?;
    write(&out_dir, "config.schema.json", &config_schema)?;

    Ok(())
}
