use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use multistep::config::Config;
use multistep::logging;
use multistep::render::TextRenderer;
use multistep::replay::{self, ReplayFrame, ReplayScript};

#[derive(Parser)]
#[command(name = "multistep")]
#[command(about = "Multi-step form navigation engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script of step notifications and button presses
    Replay {
        /// Script file (.yaml, .yml or .json)
        script: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;
    if let Some(path) = &logging_handle.log_file_path {
        tracing::debug!(path = %path.display(), "logging to file");
    }

    match cli.command {
        Commands::Replay { script, format } => cmd_replay(&config, &script, format)?,
        Commands::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

fn cmd_replay(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let script = ReplayScript::load(path)?;
    tracing::info!(
        script = %path.display(),
        events = script.events.len(),
        "replaying script"
    );

    let frames = replay::run_script(&config.wizard, &script);

    match format {
        OutputFormat::Text => print_text(&frames)?,
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&frames).context("Failed to serialize frames")?
        ),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&frames).context("Failed to serialize frames")?
        ),
    }

    Ok(())
}

fn print_text(frames: &[ReplayFrame]) -> Result<()> {
    let renderer = TextRenderer::new();
    for frame in frames {
        let event = serde_json::to_string(&frame.event).context("Failed to serialize event")?;
        let outcome =
            serde_json::to_string(&frame.outcome).context("Failed to serialize outcome")?;
        println!("#{} {} => {}", frame.index, event, outcome);
        println!("{}", renderer.render(&frame.view)?);
        println!();
    }
    Ok(())
}
