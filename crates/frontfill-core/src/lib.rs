//! Frontfill Core Library
//!
//! Detects Markdown files missing a `title` or `description` in their YAML
//! frontmatter, asks a content oracle for the missing values and rewrites
//! the files in place.

pub mod config;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod logging;
pub mod oracle;
pub mod process;
pub mod rewrite;
pub mod scan;
