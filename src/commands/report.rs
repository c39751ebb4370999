//! Run report rendering (human and JSON)

use std::io::{self, Write};
use std::path::Path;

use serde_json::json;

use crate::cli::{Cli, OutputFormat};
use frontfill_core::error::Result;
use frontfill_core::process::{ProcessingOutcome, RunSummary};

/// Report a directory with nothing to do
pub fn no_files(cli: &Cli, dir: &Path) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&to_json(&RunSummary::default()))?)?;
        }
        OutputFormat::Human => {
            if !cli.quiet {
                writeln!(out, "No markdown files found in {}", dir.display())?;
            }
        }
    }
    Ok(())
}

/// Print the run summary in the requested format
pub fn summary(cli: &Cli, summary: &RunSummary) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&to_json(summary))?)?;
        }
        OutputFormat::Human => {
            if !cli.quiet {
                write_human(&mut out, summary)?;
            }
        }
    }
    Ok(())
}

fn to_json(summary: &RunSummary) -> serde_json::Value {
    json!({
        "dry_run": summary.dry_run,
        "interrupted": summary.interrupted,
        "total": summary.total(),
        "processed": summary.processed().count(),
        "skipped": summary.skipped().count(),
        "failed": summary.failed_count(),
        "files": summary.outcomes,
    })
}

fn write_human(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    let processed: Vec<&ProcessingOutcome> = summary.processed().collect();
    let skipped: Vec<&ProcessingOutcome> = summary.skipped().collect();
    let failed: Vec<&ProcessingOutcome> = summary.failed().collect();

    if summary.dry_run {
        writeln!(out, "Dry run: no files were written")?;
    }
    writeln!(out, "Total files found: {}", summary.total())?;
    writeln!(out, "Successfully processed: {}", processed.len())?;
    writeln!(out, "Skipped (already complete): {}", skipped.len())?;
    writeln!(out, "Failed: {}", failed.len())?;

    if !processed.is_empty() {
        writeln!(out, "\nProcessed files:")?;
        for outcome in processed {
            write!(out, "  - {} ({})", outcome.filename, outcome.action)?;
            if outcome.used_fallback {
                write!(out, " [fallback]")?;
            }
            writeln!(out)?;
            if let Some(title) = &outcome.generated_title {
                writeln!(out, "      title: {title}")?;
            }
            if let Some(description) = &outcome.generated_description {
                writeln!(out, "      description: {description}")?;
            }
        }
    }

    if !skipped.is_empty() {
        writeln!(out, "\nSkipped files:")?;
        for outcome in skipped {
            writeln!(out, "  - {}", outcome.filename)?;
        }
    }

    if !failed.is_empty() {
        writeln!(out, "\nFailed files:")?;
        for outcome in failed {
            writeln!(out, "  - {} ({})", outcome.filename, outcome.action)?;
            if let Some(message) = &outcome.error_message {
                writeln!(out, "      error: {message}")?;
            }
        }
    }

    if summary.interrupted {
        writeln!(out, "\nInterrupted: remaining files were not processed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontfill_core::oracle::MockOracle;
    use frontfill_core::process::{run, RunContext};
    use std::fs;
    use tempfile::tempdir;

    fn sample_summary() -> RunSummary {
        let dir = tempdir().unwrap();
        let hello = dir.path().join("hello.md");
        let done = dir.path().join("done.md");
        fs::write(&hello, "# Hello\n\nBody text.\n").unwrap();
        fs::write(&done, "---\ntitle: T\ndescription: D\n---\n").unwrap();
        let missing = dir.path().join("gone.md");

        let ctx = RunContext::new(Box::new(MockOracle::default())).with_dry_run(true);
        run(&ctx, &[hello, done, missing])
    }

    #[test]
    fn test_human_report_sections() {
        let mut buf = Vec::new();
        write_human(&mut buf, &sample_summary()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Dry run: no files were written\n"));
        assert!(text.contains("Total files found: 3\n"));
        assert!(text.contains("  - hello.md (created-frontmatter)\n      title: Hello\n"));
        assert!(text.contains("\nSkipped files:\n  - done.md\n"));
        assert!(text.contains("  - gone.md (error)\n      error: failed to read"));
    }

    #[test]
    fn test_json_report_counts() {
        let value = to_json(&sample_summary());
        assert_eq!(value["total"], 3);
        assert_eq!(value["processed"], 1);
        assert_eq!(value["skipped"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["files"][0]["action"], "created-frontmatter");
        assert_eq!(value["files"][0]["generated_description"], "Body text.");
    }
}
