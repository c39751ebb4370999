use std::fmt;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_yaml::Value;

use super::{Frontmatter, DELIMITER};

/// A document split into its frontmatter block and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The parsed block, `None` when the document has no delimited block.
    /// A block whose YAML could not be used is `Some` and empty.
    pub frontmatter: Option<Frontmatter>,
    /// Text after the closing delimiter (or the whole text without a block)
    pub body: String,
    /// Why the block was discarded, if its YAML was malformed
    pub yaml_error: Option<String>,
}

impl ParsedDocument {
    fn without_frontmatter(text: &str) -> Self {
        Self {
            frontmatter: None,
            body: text.to_string(),
            yaml_error: None,
        }
    }
}

/// Split `text` into frontmatter and body.
///
/// The first line must be exactly `---` (trailing whitespace allowed). The
/// block ends at the first later line that is exactly `---`, so delimiter
/// lines further down the body are never mistaken for another block. A
/// document with an opening delimiter but no closing one has no frontmatter.
pub fn parse(text: &str) -> ParsedDocument {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return ParsedDocument::without_frontmatter(text);
    };
    if !is_delimiter(first) {
        return ParsedDocument::without_frontmatter(text);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            let block = &text[block_start..offset];
            let body = skip_blank_lines(&text[offset + line.len()..]);
            let (frontmatter, yaml_error) = parse_block(block);
            return ParsedDocument {
                frontmatter: Some(frontmatter),
                body: body.to_string(),
                yaml_error,
            };
        }
        offset += line.len();
    }

    tracing::debug!("opening delimiter without a closing one; treating as body");
    ParsedDocument::without_frontmatter(text)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Drop the blank separator lines between the closing delimiter and the body.
fn skip_blank_lines(mut body: &str) -> &str {
    while let Some(end) = body.find('\n') {
        if !body[..end].trim().is_empty() {
            break;
        }
        body = &body[end + 1..];
    }
    body
}

/// Parse the inner block. Anything that is not a string-keyed mapping
/// degrades to an empty mapping plus the reason.
fn parse_block(block: &str) -> (Frontmatter, Option<String>) {
    if block.trim().is_empty() {
        return (Frontmatter::new(), None);
    }

    let (frontmatter, dropped) = match serde_yaml::from_str::<RawBlock>(block) {
        Ok(RawBlock::Empty) => return (Frontmatter::new(), None),
        Ok(RawBlock::Other(kind)) => {
            return (
                Frontmatter::new(),
                Some(format!("expected a mapping, found {kind}")),
            );
        }
        Ok(RawBlock::Mapping {
            frontmatter,
            dropped,
        }) => (frontmatter, dropped),
        Err(e) => return (Frontmatter::new(), Some(e.to_string())),
    };

    if dropped > 0 && frontmatter.is_empty() {
        return (
            Frontmatter::new(),
            Some("frontmatter keys must be strings".to_string()),
        );
    }
    if dropped > 0 {
        tracing::warn!(dropped, "ignoring non-string frontmatter keys");
    }

    (frontmatter, None)
}

/// Top-level YAML value of a block.
///
/// Mappings are read entry by entry so a repeated key keeps its last value
/// instead of failing the whole block.
enum RawBlock {
    Empty,
    Mapping {
        frontmatter: Frontmatter,
        /// Entries whose key was not a string
        dropped: usize,
    },
    Other(&'static str),
}

impl<'de> Deserialize<'de> for RawBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawBlockVisitor)
    }
}

struct RawBlockVisitor;

impl<'de> Visitor<'de> for RawBlockVisitor {
    type Value = RawBlock;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a frontmatter mapping")
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawBlock, E> {
        Ok(RawBlock::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawBlock, E> {
        Ok(RawBlock::Empty)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RawBlock, E> {
        Ok(RawBlock::Other("a boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RawBlock, E> {
        Ok(RawBlock::Other("a number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RawBlock, E> {
        Ok(RawBlock::Other("a number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RawBlock, E> {
        Ok(RawBlock::Other("a number"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<RawBlock, E> {
        Ok(RawBlock::Other("a string"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawBlock, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawBlock::Other("a sequence"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawBlock, A::Error> {
        let mut frontmatter = Frontmatter::new();
        let mut dropped = 0usize;
        while let Some((key, value)) = map.next_entry::<Value, Value>()? {
            match key {
                // last one wins, first position kept
                Value::String(key) => frontmatter.insert(&key, value),
                _ => dropped += 1,
            }
        }
        Ok(RawBlock::Mapping {
            frontmatter,
            dropped,
        })
    }
}
