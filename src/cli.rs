use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use crate::{select_targets, ConfigLoader, PatchTarget, Patcher, RunReport};

/// Exit status when --fail-on-miss is set and a target stayed unpatched
pub const EXIT_MISS: u8 = 2;
/// Exit status for config and I/O errors
pub const EXIT_ERROR: u8 = 1;

#[derive(Debug, Parser)]
#[command(name = "guardpatch", version, about = "Guarded, idempotent text patching")]
pub struct Cli {
    /// Patch config (.json, .yaml/.yml or .toml), relative to the working
    /// directory; defaults to guardpatch.toml in the base directory, then the
    /// user config, then the built-in preset
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that relative target paths resolve against
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print every rule's outcome under its target's summary line
    #[arg(long, global = true)]
    pub explain: bool,

    /// Exit with status 2 when a target was not patched
    #[arg(long, global = true)]
    pub fail_on_miss: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply targets (all when none are named)
    Apply { targets: Vec<String> },
    /// Show what would change without writing
    Check { targets: Vec<String> },
    /// List configured targets and their rules
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What one invocation prints and how it exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOutput {
    pub exit_code: u8,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a parsed command line; errors become exit status 1 and a message
pub fn execute(cli: Cli) -> CliOutput {
    let mut stdout = String::new();
    match run(cli, &mut stdout) {
        Ok(exit_code) => CliOutput {
            exit_code,
            stdout,
            stderr: String::new(),
        },
        Err(e) => CliOutput {
            exit_code: EXIT_ERROR,
            stdout,
            stderr: format!("Error: {:#}\n", e),
        },
    }
}

fn run(cli: Cli, out: &mut String) -> Result<u8> {
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let (config, source) = ConfigLoader::new(&base_dir)
        .with_path(cli.config)
        .load()
        .context("Failed to load patch config")?;
    let targets = config
        .compile()
        .with_context(|| format!("Invalid patch config: {}", source))?;

    let (names, dry_run) = match cli.command {
        Command::List => {
            out.push_str(&describe_targets(&targets));
            return Ok(0);
        }
        Command::Apply { targets: names } => (names, false),
        Command::Check { targets: names } => (names, true),
    };

    let selected = select_targets(&targets, &names)?;
    info!(
        "guardpatch v{}: {} target(s) from {}",
        crate::version(),
        selected.len(),
        source
    );

    let reports = Patcher::new(&base_dir)
        .dry_run(dry_run)
        .run(selected)
        .context("Patch run aborted")?;
    let report = RunReport::new(source.to_string(), dry_run, reports);

    match cli.format {
        OutputFormat::Text => out.push_str(&report.render_text(cli.explain)),
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(&report)?);
            out.push('\n');
        }
    }

    if cli.fail_on_miss && report.has_misses() {
        return Ok(EXIT_MISS);
    }
    Ok(0)
}

pub fn describe_targets(targets: &[PatchTarget]) -> String {
    let mut out = String::new();
    for target in targets {
        out.push_str(&format!(
            "{} ({}, on_missing={:?})\n",
            target.name,
            target.path.display(),
            target.on_missing
        ));
        for rule in &target.rules {
            out.push_str(&format!(
                "  {}: {:?} at {} ({:?})\n",
                rule.name, rule.action, rule.anchor, rule.occurrences
            ));
        }
    }
    out
}
