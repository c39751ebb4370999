use serde_yaml::Value;

use super::{Frontmatter, DELIMITER};

/// Render a frontmatter block, followed by one blank line.
///
/// Values go through the YAML emitter so that any string (colons, quotes,
/// newlines, a lone `---`) re-parses to the same mapping. If the emitter
/// fails, or its output would contain a bare delimiter line, the block is
/// written line by line instead: one `key: value` per key with newlines
/// flattened. That keeps the file readable at the cost of exact round-trip.
pub fn serialize(frontmatter: &Frontmatter) -> String {
    match render_yaml(frontmatter) {
        Ok(block) => block,
        Err(reason) => {
            tracing::warn!(reason = %reason, "YAML encoding failed, writing frontmatter line by line");
            render_lines(frontmatter)
        }
    }
}

fn render_yaml(frontmatter: &Frontmatter) -> Result<String, String> {
    let mut out = String::with_capacity(64);
    out.push_str(DELIMITER);
    out.push('\n');

    if !frontmatter.is_empty() {
        let yaml = serde_yaml::to_string(frontmatter.as_mapping()).map_err(|e| e.to_string())?;
        // some emitter versions open with a document marker
        let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);

        if yaml.lines().any(|line| line.trim_end() == DELIMITER) {
            return Err("encoded value contains a frontmatter delimiter line".to_string());
        }

        out.push_str(yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
    }

    out.push_str(DELIMITER);
    out.push_str("\n\n");
    Ok(out)
}

/// Degraded line-oriented emission.
pub(crate) fn render_lines(frontmatter: &Frontmatter) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    for (key, value) in frontmatter.iter() {
        out.push_str(&flatten(key));
        out.push_str(": ");
        out.push_str(&flatten(&inline_value(value)));
        out.push('\n');
    }

    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out
}

fn inline_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => serde_yaml::to_string(other)
            .map(|yaml| yaml.trim().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces
fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::{merge, parse};

    fn round_trip(frontmatter: &Frontmatter) -> Frontmatter {
        let rendered = serialize(frontmatter);
        parse(&format!("{rendered}body\n")).frontmatter.unwrap()
    }

    #[test]
    fn test_simple_block_layout() {
        let fm = merge(&Frontmatter::new(), "Hello Guide", "A short guide about hello.");
        assert_eq!(
            serialize(&fm),
            "---\ntitle: Hello Guide\ndescription: A short guide about hello.\n---\n\n"
        );
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(serialize(&Frontmatter::new()), "---\n---\n\n");
        assert!(round_trip(&Frontmatter::new()).is_empty());
    }

    #[test]
    fn test_special_characters_round_trip() {
        let mut fm = Frontmatter::new();
        fm.insert("title", "Colons: everywhere: here");
        fm.insert("description", "line one\n---\nline three");
        fm.insert("quote", "it's \"quoted\" # not a comment");
        fm.insert("looks_bool", "true");
        fm.insert("looks_number", "0123");
        fm.insert("dashes", "---");

        let rendered = serialize(&fm);
        assert!(!rendered[4..rendered.len() - 5]
            .lines()
            .any(|line| line.trim_end() == "---"));
        assert_eq!(round_trip(&fm), fm);
    }

    #[test]
    fn test_structured_values_round_trip_in_order() {
        let doc = parse("---\nzeta: [1, 2]\nnested:\n  a: b\nflag: true\ntitle: T\n---\n");
        let fm = doc.frontmatter.unwrap();
        let back = round_trip(&fm);
        assert_eq!(back, fm);
        assert_eq!(
            back.keys().collect::<Vec<_>>(),
            vec!["zeta", "nested", "flag", "title"]
        );
    }

    #[test]
    fn test_line_fallback_flattens_newlines() {
        let mut fm = Frontmatter::new();
        fm.insert("title", "Two\nLines");
        fm.insert("count", 3);
        fm.insert("empty", Value::Null);
        assert_eq!(
            render_lines(&fm),
            "---\ntitle: Two Lines\ncount: 3\nempty: \n---\n\n"
        );
    }
}
