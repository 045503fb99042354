use std::fs;
use std::path::Path;

use guardpatch::config::presets::default_preset;
use guardpatch::patch::MissingAnchor;
use guardpatch::{Patcher, PatchTarget, RuleOutcome, TargetStatus};
use tempfile::tempdir;

const OLD_CMD: &str = "git add cafe_data_kv.json instagram_posts.json";
const NEW_CMD: &str = "git add cafe_data_kv.json instagram_posts.json instagram_token.json";

const BACKEND: &str = r#"import json
import os
from datetime import datetime
from typing import Dict, List

import requests


class MediaUrlUpdater:
    def __init__(self):
        self.ACCESS_TOKEN = os.environ.get("INSTAGRAM_ACCESS_TOKEN", "")
        self.HOST = "graph.instagram.com"
        self.instagram_posts_file = "instagram_posts.json"

    def fetch_instagram_data(self) -> List[Dict]:
        return []

    def run(self):
        try:
            # 1. Instagram APIからデータ取得
            posts = self.fetch_instagram_data()
        except Exception as e:
            logger.error(e)
"#;

const WORKFLOW: &str = "name: Update media URLs\non:\n  schedule:\n    - cron: '0 3 * * *'\njobs:\n  update:\n    runs-on: ubuntu-latest\n    steps:\n      - run: python update_media_urls.py\n      - run: |\n          git config user.name bot\n          git add cafe_data_kv.json instagram_posts.json\n          git commit -m \"Update media URLs\" || true\n";

/// Lays out `<tmp>/work` with the backend repo as a sibling, as the preset expects
fn fixture(root: &Path) -> std::path::PathBuf {
    let work = root.join("work");
    let backend = root.join("cafe_map_backend");
    fs::create_dir_all(&work).unwrap();
    fs::create_dir_all(backend.join(".github/workflows")).unwrap();
    fs::write(backend.join("update_media_urls.py"), BACKEND).unwrap();
    fs::write(
        backend.join(".github/workflows/update-media-urls.yml"),
        WORKFLOW,
    )
    .unwrap();
    work
}

fn targets() -> Vec<PatchTarget> {
    default_preset().unwrap().compile().unwrap()
}

fn target(name: &str) -> PatchTarget {
    targets().into_iter().find(|t| t.name == name).unwrap()
}

#[test]
fn workflow_patch_is_idempotent() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir
        .path()
        .join("cafe_map_backend/.github/workflows/update-media-urls.yml");
    let patcher = Patcher::new(&work);

    let first = patcher.patch_target(&target("workflow")).unwrap();
    assert_eq!(first.summary(), "Successfully updated update-media-urls.yml");
    let patched = fs::read_to_string(&file).unwrap();
    assert_eq!(patched, WORKFLOW.replace(OLD_CMD, NEW_CMD));
    assert!(patched.contains(&format!("          {}\n", NEW_CMD)));

    let second = patcher.patch_target(&target("workflow")).unwrap();
    assert_eq!(second.status, TargetStatus::AlreadyApplied);
    assert_eq!(
        second.summary(),
        "Target string not found in update-media-urls.yml"
    );
    assert_eq!(fs::read_to_string(&file).unwrap(), patched);
}

#[test]
fn workflow_already_carrying_new_command_is_untouched() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir
        .path()
        .join("cafe_map_backend/.github/workflows/update-media-urls.yml");
    let original = WORKFLOW.replace(OLD_CMD, NEW_CMD);
    fs::write(&file, &original).unwrap();

    let report = Patcher::new(&work)
        .patch_target(&target("workflow"))
        .unwrap();
    assert_eq!(
        report.summary(),
        "Target string not found in update-media-urls.yml"
    );
    assert!(!report.written);
    assert_eq!(fs::read(&file).unwrap(), original.as_bytes());
}

#[test]
fn backend_patch_inserts_exactly_three_blocks() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir.path().join("cafe_map_backend/update_media_urls.py");
    let backend = target("backend");

    let report = Patcher::new(&work).patch_target(&backend).unwrap();
    assert_eq!(report.summary(), "Successfully updated update_media_urls.py");
    assert!(report
        .rules
        .iter()
        .all(|r| r.outcome == RuleOutcome::Applied { occurrences: 1 }));

    let [init, method, call] = &backend.rules[..] else {
        panic!("expected three backend rules");
    };
    let init_anchor = "self.instagram_posts_file = \"instagram_posts.json\"";
    let method_anchor = "    def fetch_instagram_data(self) -> List[Dict]:";
    let call_anchor = "# 1. Instagram APIからデータ取得";
    let expected = BACKEND
        .replace(init_anchor, &format!("{}{}", init_anchor, init.text))
        .replace(method_anchor, &format!("{}{}", method.text, method_anchor))
        .replace(call_anchor, &format!("{}{}", call.text, call_anchor));

    let patched = fs::read_to_string(&file).unwrap();
    assert_eq!(patched, expected);
    assert!(patched.contains(
        "            # 0. アクセストークンを更新\n            self.refresh_access_token()\n            \n            # 1. Instagram APIからデータ取得\n"
    ));
    assert!(patched.contains(
        "            logger.error(f\"トークン更新処理中にエラー: {e}\")\n\n    def fetch_instagram_data(self) -> List[Dict]:\n"
    ));
}

#[test]
fn backend_patch_twice_inserts_once() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir.path().join("cafe_map_backend/update_media_urls.py");
    let patcher = Patcher::new(&work);

    patcher.patch_target(&target("backend")).unwrap();
    let once = fs::read_to_string(&file).unwrap();

    let second = patcher.patch_target(&target("backend")).unwrap();
    assert_eq!(second.status, TargetStatus::AlreadyApplied);
    assert!(second
        .rules
        .iter()
        .all(|r| r.outcome == RuleOutcome::AlreadyApplied));
    assert_eq!(fs::read_to_string(&file).unwrap(), once);
    assert_eq!(once.matches("def refresh_access_token").count(), 1);
}

#[test]
fn backend_missing_method_anchor_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir.path().join("cafe_map_backend/update_media_urls.py");
    let without_anchor = BACKEND.replace("fetch_instagram_data(self)", "fetch_posts(self)");
    fs::write(&file, &without_anchor).unwrap();

    let report = Patcher::new(&work)
        .patch_target(&target("backend"))
        .unwrap();
    assert_eq!(report.status, TargetStatus::AnchorMissing);
    assert_eq!(report.rules[1].rule, "refresh-method");
    assert_eq!(report.rules[1].outcome, RuleOutcome::AnchorMissing);
    assert!(!report.written);
    assert_eq!(fs::read_to_string(&file).unwrap(), without_anchor);
}

#[test]
fn backend_missing_method_anchor_with_skip_writes_the_rest() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let file = dir.path().join("cafe_map_backend/update_media_urls.py");
    let without_anchor = BACKEND.replace("fetch_instagram_data(self)", "fetch_posts(self)");
    fs::write(&file, &without_anchor).unwrap();

    let mut backend = target("backend");
    backend.on_missing = MissingAnchor::Skip;
    let report = Patcher::new(&work).patch_target(&backend).unwrap();
    assert_eq!(report.status, TargetStatus::Updated);
    assert_eq!(report.rules[1].outcome, RuleOutcome::AnchorMissing);

    let patched = fs::read_to_string(&file).unwrap();
    assert!(patched.contains("self.instagram_token_file = \"instagram_token.json\""));
    assert!(patched.contains("self.refresh_access_token()"));
    assert!(!patched.contains("def refresh_access_token"));
}

#[test]
fn check_run_reports_without_writing() {
    let dir = tempdir().unwrap();
    let work = fixture(dir.path());
    let reports = Patcher::new(&work).dry_run(true).run(&targets()).unwrap();

    assert!(reports.iter().all(|r| r.status == TargetStatus::WouldUpdate));
    assert_eq!(
        fs::read_to_string(dir.path().join("cafe_map_backend/update_media_urls.py")).unwrap(),
        BACKEND
    );
    let diff = reports[1].diff.as_deref().unwrap();
    assert!(diff.contains("--- a/update-media-urls.yml"));
    assert!(!diff.contains("../"));
    assert!(diff.contains(&format!("+          {}", NEW_CMD)));
}
