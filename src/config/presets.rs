// Built-in patch sets compiled into the binary

use super::config::{ConfigFormat, PatchConfig};
use crate::error::PatchResult;

/// Token refresh for the media URL updater backend and its workflow
pub const INSTAGRAM_TOKEN: &str = include_str!("../../presets/instagram-token.toml");

pub fn default_preset() -> PatchResult<PatchConfig> {
    PatchConfig::parse(INSTAGRAM_TOKEN, ConfigFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{MissingAnchor, Occurrences, RuleAction};

    #[test]
    fn test_default_preset_compiles() {
        let targets = default_preset().unwrap().compile().unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["backend", "workflow"]);

        let backend = &targets[0];
        assert_eq!(backend.on_missing, MissingAnchor::Fail);
        let rules: Vec<&str> = backend.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rules, vec!["token-file-init", "refresh-method", "refresh-call"]);
        assert_eq!(backend.rules[0].action, RuleAction::InsertAfter);
        assert_eq!(backend.rules[1].action, RuleAction::InsertBefore);
        assert_eq!(backend.rules[2].action, RuleAction::InsertBefore);

        let workflow = &targets[1];
        assert_eq!(workflow.file_name(), "update-media-urls.yml");
        assert_eq!(workflow.rules[0].action, RuleAction::Replace);
        assert_eq!(workflow.rules[0].occurrences, Occurrences::All);
    }

    #[test]
    fn test_backend_texts_keep_python_layout() {
        let config = default_preset().unwrap();
        let rules = &config.targets[0].rules;
        assert!(rules[0]
            .text
            .starts_with("\n        self.instagram_token_file = \"instagram_token.json\"\n"));
        assert!(rules[1]
            .text
            .starts_with("\n    def refresh_access_token(self) -> None:\n"));
        assert!(rules[1].text.ends_with("{e}\")\n\n"));
        assert_eq!(
            rules[2].text,
            "# 0. アクセストークンを更新\n            self.refresh_access_token()\n            \n            "
        );
    }
}
