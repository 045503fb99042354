use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::rule::{PatchRule, RuleOutcome};

/// What a target does when one of its anchors is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingAnchor {
    /// Leave the file untouched
    #[default]
    Fail,
    /// Apply the rules that matched and write if anything changed
    Skip,
}

/// A file and the ordered rules to apply to it
#[derive(Debug, Clone)]
pub struct PatchTarget {
    pub name: String,
    pub path: PathBuf,
    pub on_missing: MissingAnchor,
    pub rules: Vec<PatchRule>,
}

/// Outcome of one rule, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: String,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

/// Result of running every rule of a target over some content
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// Content after all applicable rules
    pub content: String,
    /// One entry per rule, in rule order
    pub rules: Vec<RuleReport>,
    /// Whether any rule changed the content
    pub changes_made: bool,
}

impl PatchOutcome {
    pub fn missing(&self) -> impl Iterator<Item = &RuleReport> {
        self.rules
            .iter()
            .filter(|r| r.outcome == RuleOutcome::AnchorMissing)
    }

    pub fn has_ambiguity(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.outcome, RuleOutcome::Ambiguous { .. }))
    }

    /// The guard: may this outcome be written back under `policy`?
    pub fn may_write(&self, policy: MissingAnchor) -> bool {
        if !self.changes_made || self.has_ambiguity() {
            return false;
        }
        match policy {
            MissingAnchor::Fail => self.rules.iter().all(|r| r.outcome.is_satisfied()),
            MissingAnchor::Skip => true,
        }
    }
}

/// Applies rules sequentially; each rule sees the output of the previous one
pub fn apply_rules(content: &str, rules: &[PatchRule]) -> PatchOutcome {
    let mut current = content.to_string();
    let mut reports = Vec::with_capacity(rules.len());
    let mut changes_made = false;

    for rule in rules {
        let (patched, outcome) = rule.apply(&current);
        if let Some(patched) = patched {
            current = patched;
            changes_made = true;
        }
        match &outcome {
            RuleOutcome::AnchorMissing => {
                warn!("Anchor for rule '{}' not found: {}", rule.name, rule.anchor)
            }
            RuleOutcome::Ambiguous { count } => warn!(
                "Anchor for rule '{}' matches {} locations: {}",
                rule.name, count, rule.anchor
            ),
            other => debug!("Rule '{}': {}", rule.name, other),
        }
        reports.push(RuleReport {
            rule: rule.name.clone(),
            outcome,
        });
    }

    PatchOutcome {
        content: current,
        rules: reports,
        changes_made,
    }
}

impl PatchTarget {
    pub fn apply(&self, content: &str) -> PatchOutcome {
        apply_rules(content, &self.rules)
    }

    /// Final path component, used in summary lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
