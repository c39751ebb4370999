//! Deterministic oracle for demos, dry runs and tests.

use std::collections::HashMap;

use super::{readable_stem, ContentOracle, GeneratedContent, OracleLimits};
use crate::error::Result;

/// Oracle that never leaves the process.
///
/// Preset responses are keyed by file name. Anything else gets its title
/// from the first Markdown heading (or the file name) and its description
/// from the first paragraph.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    responses: HashMap<String, GeneratedContent>,
    limits: OracleLimits,
}

impl MockOracle {
    pub fn new(limits: OracleLimits) -> Self {
        Self {
            responses: HashMap::new(),
            limits,
        }
    }

    /// Register a fixed response for `filename`
    pub fn with_response(
        mut self,
        filename: impl Into<String>,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Self {
        self.responses
            .insert(filename.into(), GeneratedContent::new(title, description));
        self
    }
}

impl ContentOracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, body: &str, filename_hint: &str) -> Result<GeneratedContent> {
        if let Some(preset) = self.responses.get(filename_hint) {
            return Ok(preset.clone());
        }

        let body = self.limits.clip_body(body);
        let base = readable_stem(filename_hint);
        let title = extract_first_heading(body).unwrap_or_else(|| base.clone());
        let description = extract_first_paragraph(body)
            .unwrap_or_else(|| format!("Documentation for {}", base.to_lowercase()));

        Ok(self.limits.apply(GeneratedContent::new(title, description)))
    }
}

/// Text of the first ATX heading
fn extract_first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|heading| !heading.is_empty())
}

/// Extract the first paragraph from markdown
fn extract_first_paragraph(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    // Skip any leading heading
    let mut lines = body.lines().peekable();
    while let Some(line) = lines.peek() {
        if line.starts_with('#') || line.trim().is_empty() {
            lines.next();
        } else {
            break;
        }
    }

    let mut para_lines = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        para_lines.push(line.trim());
    }

    if para_lines.is_empty() {
        None
    } else {
        Some(para_lines.join(" "))
    }
}
