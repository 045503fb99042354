use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::debug;

use super::anchor::{Anchor, AnchorMatch};

/// What a rule does at its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleAction {
    /// The anchor is replaced by the rule text
    Replace,
    /// The rule text is placed immediately before the anchor
    InsertBefore,
    /// The rule text is placed immediately after the anchor
    InsertAfter,
}

/// How many pending anchor locations a rule accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrences {
    /// Exactly one location; more is reported as ambiguous
    #[default]
    Once,
    /// Every location
    All,
}

/// A (match, replacement) pair applied to file content
#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: String,
    pub anchor: Anchor,
    pub action: RuleAction,
    pub text: String,
    pub occurrences: Occurrences,
}

/// Result of applying one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    Applied { occurrences: usize },
    AlreadyApplied,
    AnchorMissing,
    Ambiguous { count: usize },
}

impl RuleOutcome {
    /// Whether the rule left the file in its intended state
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RuleOutcome::Applied { .. } | RuleOutcome::AlreadyApplied)
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuleOutcome::Applied { occurrences: 1 } => write!(f, "applied"),
            RuleOutcome::Applied { occurrences } => write!(f, "applied at {} locations", occurrences),
            RuleOutcome::AlreadyApplied => write!(f, "already applied"),
            RuleOutcome::AnchorMissing => write!(f, "anchor not found"),
            RuleOutcome::Ambiguous { count } => {
                write!(f, "anchor is ambiguous ({} matches, expected 1)", count)
            }
        }
    }
}

impl PatchRule {
    pub fn new(
        name: impl Into<String>,
        anchor: Anchor,
        action: RuleAction,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            anchor,
            action,
            text: text.into(),
            occurrences: Occurrences::Once,
        }
    }

    pub fn with_occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Text the anchor location holds once this rule has been applied there
    fn post_image(&self, m: &AnchorMatch) -> String {
        match self.action {
            RuleAction::Replace => m.expand(&self.text),
            RuleAction::InsertBefore => format!("{}{}", self.text, m.text),
            RuleAction::InsertAfter => format!("{}{}", m.text, self.text),
        }
    }

    /// Span of an applied copy of `post_image` that contains this match.
    ///
    /// The anchor text may occur more than once inside its own post-image
    /// (rule text that repeats the anchor), so every such offset is tried.
    fn applied_span(
        &self,
        content: &str,
        m: &AnchorMatch,
        post_image: &str,
    ) -> Option<Range<usize>> {
        post_image
            .char_indices()
            .map(|(offset, _)| offset)
            .filter(|&offset| offset <= m.start && post_image[offset..].starts_with(m.text))
            .map(|offset| m.start - offset)
            .find(|&begin| {
                content
                    .get(begin..)
                    .is_some_and(|rest| rest.starts_with(post_image))
            })
            .map(|begin| begin..begin + post_image.len())
    }

    /// Applies the rule to `content`.
    ///
    /// Returns `None` for the new content when nothing changed; all bytes
    /// outside the patched locations are preserved.
    pub fn apply(&self, content: &str) -> (Option<String>, RuleOutcome) {
        let matches = self.anchor.find_all(content);
        if matches.is_empty() {
            debug!("Rule '{}': anchor {} not found", self.name, self.anchor);
            return (None, RuleOutcome::AnchorMissing);
        }

        let post_images: Vec<String> = matches.iter().map(|m| self.post_image(m)).collect();
        let applied: Vec<Range<usize>> = matches
            .iter()
            .zip(&post_images)
            .filter_map(|(m, post_image)| self.applied_span(content, m, post_image))
            .collect();

        // Anything inside an applied post-image belongs to it, whatever its own post-image
        let pending: Vec<(&AnchorMatch, &String)> = matches
            .iter()
            .zip(&post_images)
            .filter(|(m, _)| {
                !applied
                    .iter()
                    .any(|span| span.start <= m.start && m.end <= span.end)
            })
            .collect();

        if pending.is_empty() {
            debug!(
                "Rule '{}': all {} anchor locations already patched",
                self.name,
                matches.len()
            );
            return (None, RuleOutcome::AlreadyApplied);
        }

        if self.occurrences == Occurrences::Once && pending.len() > 1 {
            return (None, RuleOutcome::Ambiguous { count: pending.len() });
        }

        let mut result = String::with_capacity(
            content.len() + pending.iter().map(|(_, p)| p.len()).sum::<usize>(),
        );
        let mut last = 0;
        for (m, post_image) in &pending {
            result.push_str(&content[last..m.start]);
            result.push_str(post_image.as_str());
            last = m.end;
        }
        result.push_str(&content[last..]);

        debug!(
            "Rule '{}': patched {} location(s) at {}",
            self.name,
            pending.len(),
            self.anchor
        );

        (
            Some(result),
            RuleOutcome::Applied {
                occurrences: pending.len(),
            },
        )
    }
}
