use super::{parse, Frontmatter, ParsedDocument, DESCRIPTION_KEY, TITLE_KEY};

/// What a document already has and whether it needs work.
///
/// Built once per file and never mutated; the pipeline consumes it with
/// [`Analysis::into_parts`].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    has_frontmatter: bool,
    has_title: bool,
    has_description: bool,
    frontmatter: Frontmatter,
    body: String,
}

impl Analysis {
    /// Derive the analysis from a parsed document
    pub fn from_parsed(doc: ParsedDocument) -> Self {
        let has_frontmatter = doc.frontmatter.is_some();
        let frontmatter = doc.frontmatter.unwrap_or_default();

        Self {
            has_frontmatter,
            has_title: frontmatter.has_value(TITLE_KEY),
            has_description: frontmatter.has_value(DESCRIPTION_KEY),
            frontmatter,
            body: doc.body,
        }
    }

    pub fn has_frontmatter(&self) -> bool {
        self.has_frontmatter
    }

    pub fn has_title(&self) -> bool {
        self.has_title
    }

    pub fn has_description(&self) -> bool {
        self.has_description
    }

    /// True unless both title and description are already present
    pub fn needs_processing(&self) -> bool {
        !(self.has_title && self.has_description)
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        &self.frontmatter
    }

    /// Document content after the frontmatter block
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consume the analysis, yielding the existing block and body
    pub fn into_parts(self) -> (Frontmatter, String) {
        (self.frontmatter, self.body)
    }
}

/// Parse and analyze raw document text
pub fn analyze(text: &str) -> Analysis {
    let doc = parse(text);
    if let Some(reason) = &doc.yaml_error {
        tracing::warn!(reason = %reason, "invalid YAML frontmatter, treating block as empty");
    }
    Analysis::from_parsed(doc)
}
