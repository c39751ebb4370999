//! Whole-file rewrite of a Markdown document.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{FrontfillError, Result};

/// Replace the file at `path` with `frontmatter` followed by `body`.
///
/// The new content is written to a temporary file in the same directory and
/// renamed over the original, so a failed write leaves the original file
/// untouched. The original permissions are carried over. No backup is kept.
/// A read-only file is a write failure, even when its directory would allow
/// the rename.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn rewrite(path: &Path, frontmatter: &str, body: &str) -> Result<()> {
    let permissions = fs::metadata(path)
        .map_err(|e| FrontfillError::io_operation("stat", path.display(), e))?
        .permissions();
    if permissions.readonly() {
        return Err(FrontfillError::io_operation(
            "write",
            path.display(),
            "file is read-only",
        ));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| FrontfillError::io_operation("create temp file in", dir.display(), e))?;

    let write = |tmp: &mut NamedTempFile| -> std::io::Result<()> {
        tmp.write_all(frontmatter.as_bytes())?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()
    };
    write(&mut tmp).map_err(|e| FrontfillError::io_operation("write", path.display(), e))?;

    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| FrontfillError::io_operation("set permissions on", path.display(), e))?;

    tmp.persist(path)
        .map_err(|e| FrontfillError::io_operation("replace", path.display(), e.error))?;

    tracing::debug!(bytes = frontmatter.len() + body.len(), "file rewritten");
    Ok(())
}
