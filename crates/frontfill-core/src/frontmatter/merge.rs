use super::{Frontmatter, DESCRIPTION_KEY, TITLE_KEY};

/// Fill in `title` and `description` without overwriting present values.
///
/// Every existing key keeps its value and position. A key that exists with
/// an empty value is filled in place; a missing key is appended, `title`
/// before `description`. Merging the result again with any candidates is a
/// no-op.
pub fn merge(existing: &Frontmatter, title: &str, description: &str) -> Frontmatter {
    let mut merged = existing.clone();

    if !merged.has_value(TITLE_KEY) {
        tracing::debug!(title, "adding title");
        merged.insert(TITLE_KEY, title);
    }
    if !merged.has_value(DESCRIPTION_KEY) {
        tracing::debug!(description, "adding description");
        merged.insert(DESCRIPTION_KEY, description);
    }

    merged
}
