// Configuration module for guardpatch
// Declarative patch targets, their loading and the built-in presets

#[allow(clippy::module_inception)]
pub mod config;
pub mod config_loader;
pub mod presets;

// Re-export main types for easier access
pub use config::{ConfigFormat, PatchConfig, RuleConfig, TargetConfig};
pub use config_loader::{ConfigLoader, ConfigSource, PROJECT_CONFIG_FILE};
