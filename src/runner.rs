use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::diff::{diff_stats, unified_diff};
use crate::error::{PatchError, PatchResult};
use crate::file::load_file;
use crate::patch::PatchTarget;
use crate::report::{TargetReport, TargetStatus};

/// Drives targets through load, patch, guard and write
#[derive(Debug, Clone)]
pub struct Patcher {
    base_dir: PathBuf,
    dry_run: bool,
}

impl Patcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            dry_run: false,
        }
    }

    /// In a dry run nothing is written and each report carries a diff
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve_path(&self, target: &PatchTarget) -> PathBuf {
        if target.path.is_relative() {
            self.base_dir.join(&target.path)
        } else {
            target.path.clone()
        }
    }

    pub fn patch_target(&self, target: &PatchTarget) -> PatchResult<TargetReport> {
        let path = self.resolve_path(target);
        info!("Patching target '{}': {}", target.name, path.display());

        let loaded = load_file(&path)?;
        let outcome = target.apply(&loaded.content);

        let status = if outcome.has_ambiguity() {
            TargetStatus::Ambiguous
        } else if outcome.may_write(target.on_missing) {
            if self.dry_run {
                TargetStatus::WouldUpdate
            } else {
                TargetStatus::Updated
            }
        } else if outcome.missing().next().is_some() {
            TargetStatus::AnchorMissing
        } else {
            TargetStatus::AlreadyApplied
        };

        for missing in outcome.missing() {
            warn!(
                "Target '{}': anchor of rule '{}' not found",
                target.name, missing.rule
            );
        }

        let mut written = false;
        let mut diff = None;
        match status {
            TargetStatus::Updated => {
                loaded.write_back(&outcome.content)?;
                written = true;
                let stats = diff_stats(&loaded.content, &outcome.content);
                info!(
                    "Updated {} (+{} -{} lines)",
                    path.display(),
                    stats.inserted,
                    stats.deleted
                );
            }
            TargetStatus::WouldUpdate => {
                diff = Some(unified_diff(
                    &target.file_name(),
                    &loaded.content,
                    &outcome.content,
                ));
            }
            _ => info!("Left {} untouched ({:?})", path.display(), status),
        }

        Ok(TargetReport {
            target: target.name.clone(),
            path: target.path.clone(),
            status,
            written,
            rules: outcome.rules,
            diff,
        })
    }

    /// Runs targets in order; an I/O error aborts the remaining targets
    pub fn run<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a PatchTarget>,
    ) -> PatchResult<Vec<TargetReport>> {
        targets
            .into_iter()
            .map(|target| self.patch_target(target))
            .collect()
    }
}

/// Picks targets by name, keeping config order; no names selects all
pub fn select_targets<'a>(
    targets: &'a [PatchTarget],
    names: &[String],
) -> PatchResult<Vec<&'a PatchTarget>> {
    if let Some(unknown) = names
        .iter()
        .find(|name| !targets.iter().any(|t| &t.name == *name))
    {
        return Err(PatchError::unknown_target(unknown.clone()));
    }

    Ok(targets
        .iter()
        .filter(|t| names.is_empty() || names.contains(&t.name))
        .collect())
}
