use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{map_io_err, PatchError, PatchResult};
use crate::patch::{
    Anchor, MissingAnchor, Occurrences, PatchRule, PatchTarget, RuleAction,
};

/// Declarative patch configuration: an ordered list of targets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PatchConfig {
    #[serde(default, rename = "target", alias = "targets")]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    pub name: String,

    /// Relative paths resolve against the run's base directory
    pub path: PathBuf,

    #[serde(default)]
    pub on_missing: MissingAnchor,

    #[serde(default, rename = "rule", alias = "rules")]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    pub name: String,

    /// Literal text, or a regular expression when `regex` is set
    pub anchor: String,

    #[serde(default)]
    pub regex: bool,

    pub action: RuleAction,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub occurrences: Occurrences,
}

/// Config file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> PatchResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(PatchError::config(format!(
                "Unsupported config format: '{}' ({})",
                ext,
                path.display()
            ))),
        }
    }
}

impl PatchConfig {
    pub fn load(path: &Path) -> PatchResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(map_io_err(path))?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> PatchResult<Self> {
        match format {
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
        }
    }

    /// Validates the config and builds the targets it describes
    pub fn compile(&self) -> PatchResult<Vec<PatchTarget>> {
        if self.targets.is_empty() {
            return Err(PatchError::config("no targets defined"));
        }

        let mut names = HashSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            if !names.insert(target.name.as_str()) {
                return Err(PatchError::config(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            targets.push(target.compile()?);
        }
        Ok(targets)
    }
}

impl TargetConfig {
    fn compile(&self) -> PatchResult<PatchTarget> {
        if self.name.trim().is_empty() {
            return Err(PatchError::config("target name must not be empty"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(PatchError::config(format!(
                "target '{}' has an empty path",
                self.name
            )));
        }
        if self.rules.is_empty() {
            return Err(PatchError::config(format!(
                "target '{}' has no rules",
                self.name
            )));
        }

        let mut names = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !names.insert(rule.name.as_str()) {
                return Err(PatchError::config(format!(
                    "duplicate rule name '{}' in target '{}'",
                    rule.name, self.name
                )));
            }
            rules.push(rule.compile()?);
        }

        Ok(PatchTarget {
            name: self.name.clone(),
            path: self.path.clone(),
            on_missing: self.on_missing,
            rules,
        })
    }
}

impl RuleConfig {
    fn compile(&self) -> PatchResult<PatchRule> {
        if self.anchor.is_empty() {
            return Err(PatchError::config(format!(
                "rule '{}' has an empty anchor",
                self.name
            )));
        }
        if self.text.is_empty() && self.action != RuleAction::Replace {
            return Err(PatchError::config(format!(
                "rule '{}' inserts empty text",
                self.name
            )));
        }

        let anchor = if self.regex {
            let regex = Regex::new(&self.anchor).map_err(|source| PatchError::InvalidPattern {
                rule: self.name.clone(),
                source,
            })?;
            if regex.is_match("") {
                return Err(PatchError::config(format!(
                    "pattern of rule '{}' matches the empty string",
                    self.name
                )));
            }
            Anchor::pattern(regex)
        } else {
            Anchor::literal(self.anchor.clone())
        };

        Ok(PatchRule::new(self.name.clone(), anchor, self.action, self.text.clone())
            .with_occurrences(self.occurrences))
    }
}
