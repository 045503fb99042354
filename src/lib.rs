// guardpatch - guarded, idempotent text patching of files
// Targets and their anchor rules come from a declarative config; a file is
// only written when every rule either applied or was already applied.

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod file;
pub mod patch;
pub mod report;
pub mod runner;

pub use config::{ConfigLoader, ConfigSource, PatchConfig};
pub use error::{PatchError, PatchResult};
pub use patch::{PatchTarget, RuleOutcome};
pub use report::{RunReport, TargetReport, TargetStatus};
pub use runner::{select_targets, Patcher};

use anyhow::{anyhow, Result};
use tracing::debug;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize logging to stderr
///
/// Stdout carries the patch summary, so logs never go there. `RUST_LOG`
/// overrides the default filter.
pub fn init_with_logger(verbose: bool) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "guardpatch=debug"
    } else {
        "guardpatch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt::Subscriber::builder()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    debug!("Initializing guardpatch v{}", version());
    Ok(())
}
