use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::patch::RuleReport;

/// What happened to a target file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// Patched and written
    Updated,
    /// Dry run: would have been patched
    WouldUpdate,
    /// Every rule was already applied; file untouched
    AlreadyApplied,
    /// At least one anchor is missing and nothing was written
    AnchorMissing,
    /// A rule matched more than one location; file untouched
    Ambiguous,
}

impl TargetStatus {
    /// Whether the target ended up (or would end up) patched by this run
    pub fn is_patch(&self) -> bool {
        matches!(self, TargetStatus::Updated | TargetStatus::WouldUpdate)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: String,
    pub path: PathBuf,
    pub status: TargetStatus,
    pub written: bool,
    pub rules: Vec<RuleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl TargetReport {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// The one-line result printed for this target
    pub fn summary(&self) -> String {
        let file = self.file_name();
        match self.status {
            TargetStatus::Updated => format!("Successfully updated {}", file),
            TargetStatus::WouldUpdate => format!("Would update {}", file),
            TargetStatus::AlreadyApplied | TargetStatus::AnchorMissing => {
                format!("Target string not found in {}", file)
            }
            TargetStatus::Ambiguous => format!("Ambiguous anchor in {}", file),
        }
    }
}

impl fmt::Display for TargetReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Everything one invocation did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub config: String,
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    pub fn new(config: impl Into<String>, dry_run: bool, targets: Vec<TargetReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            config: config.into(),
            dry_run,
            targets,
        }
    }

    /// True when some target was left unpatched
    pub fn has_misses(&self) -> bool {
        self.targets.iter().any(|t| !t.status.is_patch())
    }

    /// Summary lines, optionally followed by one indented line per rule
    pub fn render_text(&self, explain: bool) -> String {
        let mut out = String::new();
        for target in &self.targets {
            out.push_str(&target.summary());
            out.push('\n');
            if explain {
                for rule in &target.rules {
                    out.push_str(&format!("  {}: {}\n", rule.rule, rule.outcome));
                }
            }
            if let Some(diff) = &target.diff {
                out.push_str(diff);
            }
        }
        out
    }
}
