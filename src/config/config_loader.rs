use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::config::PatchConfig;
use super::presets;
use crate::error::{PatchError, PatchResult};

/// File name looked up in the base directory
pub const PROJECT_CONFIG_FILE: &str = "guardpatch.toml";

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Preset,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Preset => write!(f, "built-in preset"),
        }
    }
}

/// Resolves and loads the patch configuration.
///
/// Lookup order: an explicit path, `guardpatch.toml` in the base directory,
/// the user config file, then the built-in preset. An explicit path is taken
/// as given, so a relative one is relative to the working directory.
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    base_dir: PathBuf,
    user_config: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: None,
            base_dir: base_dir.into(),
            user_config: Self::default_user_config_path(),
        }
    }

    /// Set a custom config path
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    /// `<config dir>/guardpatch/config.toml`
    pub fn default_user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("guardpatch").join("config.toml"))
    }

    fn resolve(&self) -> PatchResult<ConfigSource> {
        if let Some(path) = &self.explicit_path {
            if !path.is_file() {
                return Err(PatchError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(ConfigSource::File(path.clone()));
        }

        let project = self.base_dir.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Ok(ConfigSource::File(project));
        }

        if let Some(user) = self.user_config.as_deref().filter(|p| p.is_file()) {
            return Ok(ConfigSource::File(user.to_path_buf()));
        }

        Ok(ConfigSource::Preset)
    }

    pub fn load(&self) -> PatchResult<(PatchConfig, ConfigSource)> {
        let source = self.resolve()?;
        debug!("Resolved config source: {}", source);

        let config = match &source {
            ConfigSource::File(path) => PatchConfig::load(path)?,
            ConfigSource::Preset => presets::default_preset()?,
        };

        info!(
            "Loaded {} target(s) from {}",
            config.targets.len(),
            source
        );
        Ok((config, source))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
