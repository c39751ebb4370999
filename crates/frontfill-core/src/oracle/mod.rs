//! Content oracles: turn a document body into a short title and description.

mod llm;
mod mock;

pub use llm::{LlmOracle, LlmSettings, ANTHROPIC_VERSION};
pub use mock::MockOracle;

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// A generated `(title, description)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContent {
    pub title: String,
    pub description: String,
}

impl GeneratedContent {
    /// Build a pair, collapsing any whitespace runs (newlines included) to
    /// single spaces.
    pub fn new(title: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self {
            title: single_line(title.as_ref()),
            description: single_line(description.as_ref()),
        }
    }

    /// True when both title and description are non-empty
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty()
    }
}

/// Word limits applied to generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleLimits {
    pub max_title_words: usize,
    pub max_description_words: usize,
    /// How much of the body is handed to the oracle
    pub max_body_chars: usize,
}

impl Default for OracleLimits {
    fn default() -> Self {
        Self {
            max_title_words: 5,
            max_description_words: 20,
            max_body_chars: 2000,
        }
    }
}

impl OracleLimits {
    /// Cut title and description down to the configured word counts
    pub fn apply(&self, content: GeneratedContent) -> GeneratedContent {
        let (title, title_cut) = truncate_words(&content.title, self.max_title_words);
        if title_cut {
            tracing::warn!(
                max = self.max_title_words,
                original = %content.title,
                "generated title too long, truncating"
            );
        }

        let (description, description_cut) =
            truncate_words(&content.description, self.max_description_words);
        if description_cut {
            tracing::warn!(
                max = self.max_description_words,
                original = %content.description,
                "generated description too long, truncating"
            );
        }

        GeneratedContent { title, description }
    }

    /// The prefix of `body` an oracle should look at
    pub fn clip_body<'a>(&self, body: &'a str) -> &'a str {
        match body.char_indices().nth(self.max_body_chars) {
            Some((idx, _)) => &body[..idx],
            None => body,
        }
    }
}

/// Something that can produce a title and description for a document.
pub trait ContentOracle {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Generate a title and description from `body`. `filename_hint` is the
    /// document's file name.
    fn generate(&self, body: &str, filename_hint: &str) -> Result<GeneratedContent>;
}

/// Title and description derived from the file name alone.
///
/// `getting-started.md` becomes `Getting Started Documentation` /
/// `Documentation and information about getting started`.
pub fn fallback_content(filename: &str) -> GeneratedContent {
    let base = readable_stem(filename);
    GeneratedContent::new(
        format!("{base} Documentation"),
        format!("Documentation and information about {}", base.to_lowercase()),
    )
}

/// File stem with `_`/`-` turned into spaces, title-cased
pub(crate) fn readable_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let words: Vec<String> = stem
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case_word)
        .collect();

    if words.is_empty() {
        "Untitled".to_string()
    } else {
        words.join(" ")
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` words. Returns the text and whether anything was cut.
pub(crate) fn truncate_words(text: &str, max: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max {
        (words.join(" "), false)
    } else {
        (words[..max].join(" "), true)
    }
}
