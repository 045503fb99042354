use regex::{Captures, Regex};
use std::fmt;

/// Locates the insertion/replacement point of a rule inside file content
#[derive(Debug, Clone)]
pub enum Anchor {
    /// Plain substring, matched byte for byte
    Literal(String),
    /// Regular expression
    Pattern(Regex),
}

/// A single non-overlapping occurrence of an anchor
#[derive(Debug)]
pub struct AnchorMatch<'c> {
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    /// The matched text
    pub text: &'c str,
    captures: Option<Captures<'c>>,
}

impl<'c> AnchorMatch<'c> {
    /// Expands `$1` / `${name}` references for pattern anchors.
    /// Literal anchors return the template unchanged.
    pub fn expand(&self, template: &str) -> String {
        match &self.captures {
            Some(caps) => {
                let mut expanded = String::new();
                caps.expand(template, &mut expanded);
                expanded
            }
            None => template.to_string(),
        }
    }
}

impl Anchor {
    pub fn literal(text: impl Into<String>) -> Self {
        Anchor::Literal(text.into())
    }

    pub fn pattern(regex: Regex) -> Self {
        Anchor::Pattern(regex)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Anchor::Pattern(_))
    }

    /// Returns every non-overlapping match, left to right
    pub fn find_all<'c>(&self, content: &'c str) -> Vec<AnchorMatch<'c>> {
        match self {
            Anchor::Literal(needle) => {
                if needle.is_empty() {
                    return Vec::new();
                }
                content
                    .match_indices(needle.as_str())
                    .map(|(start, text)| AnchorMatch {
                        start,
                        end: start + text.len(),
                        text,
                        captures: None,
                    })
                    .collect()
            }
            Anchor::Pattern(regex) => regex
                .captures_iter(content)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    if whole.as_str().is_empty() {
                        return None;
                    }
                    Some(AnchorMatch {
                        start: whole.start(),
                        end: whole.end(),
                        text: whole.as_str(),
                        captures: Some(caps),
                    })
                })
                .collect(),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Anchor::Literal(text) => write!(f, "{:?}", text),
            Anchor::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}
