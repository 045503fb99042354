// Rule engine: anchors, rules and the per-target guard

pub mod anchor;
pub mod rule;
pub mod target;

pub use anchor::{Anchor, AnchorMatch};
pub use rule::{Occurrences, PatchRule, RuleAction, RuleOutcome};
pub use target::{apply_rules, MissingAnchor, PatchOutcome, PatchTarget, RuleReport};
