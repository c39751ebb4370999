//! Per-file pipeline and run driver
//!
//! Each file goes read → analyze → (oracle) → merge → serialize → rewrite.
//! Every per-file failure becomes a [`ProcessingOutcome`]; nothing short of
//! an interrupt stops the run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::frontmatter::{analyze, merge, serialize, Analysis};
use crate::oracle::{fallback_content, ContentOracle, GeneratedContent};
use crate::rewrite::rewrite;
use crate::trace_time;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Skipped,
    CreatedFrontmatter,
    AddedTitle,
    AddedDescription,
    AddedTitleAndDescription,
    FailedWrite,
    Error,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Skipped => "skipped",
            Action::CreatedFrontmatter => "created-frontmatter",
            Action::AddedTitle => "added-title",
            Action::AddedDescription => "added-description",
            Action::AddedTitleAndDescription => "added-title-and-description",
            Action::FailedWrite => "failed-write",
            Action::Error => "error",
        }
    }

    /// The change an analysis calls for
    fn for_analysis(analysis: &Analysis) -> Self {
        match (
            analysis.has_frontmatter(),
            analysis.has_title(),
            analysis.has_description(),
        ) {
            (false, _, _) => Action::CreatedFrontmatter,
            (true, true, true) => Action::Skipped,
            (true, false, true) => Action::AddedTitle,
            (true, true, false) => Action::AddedDescription,
            (true, false, false) => Action::AddedTitleAndDescription,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    pub filename: String,
    pub path: PathBuf,
    pub success: bool,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_description: Option<String>,
    /// True when the oracle failed and the filename fallback was used
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProcessingOutcome {
    fn new(path: &Path, action: Action) -> Self {
        Self {
            filename: display_name(path),
            path: path.to_path_buf(),
            success: !matches!(action, Action::FailedWrite | Action::Error),
            action,
            generated_title: None,
            generated_description: None,
            used_fallback: false,
            error_message: None,
        }
    }

    fn failed(path: &Path, action: Action, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(path, action)
        }
    }

    /// True when the file was (or in a dry run, would be) rewritten
    pub fn is_processed(&self) -> bool {
        self.success && self.action != Action::Skipped
    }
}

/// A rewrite computed for one document, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRewrite {
    pub action: Action,
    /// Serialized frontmatter block, including the trailing blank line
    pub frontmatter: String,
    pub body: String,
    pub generated: GeneratedContent,
    pub used_fallback: bool,
}

impl PlannedRewrite {
    /// Complete new file content
    pub fn content(&self) -> String {
        format!("{}{}", self.frontmatter, self.body)
    }
}

/// Shared state for one run: the oracle and run-wide switches.
pub struct RunContext {
    oracle: Box<dyn ContentOracle>,
    dry_run: bool,
    interrupted: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(oracle: Box<dyn ContentOracle>) -> Self {
        Self {
            oracle,
            dry_run: false,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Compute outcomes without touching any file
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Share an interrupt flag (set from a signal handler)
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn oracle(&self) -> &dyn ContentOracle {
        self.oracle.as_ref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// Outcomes of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<ProcessingOutcome>,
    /// The run stopped early on an interrupt
    pub interrupted: bool,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn processed(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes.iter().filter(|o| o.is_processed())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.success && o.action == Action::Skipped)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Ask the oracle, falling back to filename-derived content on failure or
/// an incomplete answer. Returns the content and whether the fallback was used.
pub fn generate_or_fallback(
    oracle: &dyn ContentOracle,
    body: &str,
    filename: &str,
) -> (GeneratedContent, bool) {
    match oracle.generate(body, filename) {
        Ok(content) if content.is_complete() => (content, false),
        Ok(_) => {
            tracing::warn!(oracle = oracle.name(), "oracle returned empty content, using fallback");
            (fallback_content(filename), true)
        }
        Err(e) => {
            tracing::warn!(oracle = oracle.name(), error = %e, "oracle failed, using fallback");
            (fallback_content(filename), true)
        }
    }
}

/// Work out the new content for a document, or `None` if it is complete.
pub fn plan_rewrite(
    oracle: &dyn ContentOracle,
    analysis: Analysis,
    filename: &str,
) -> Option<PlannedRewrite> {
    if !analysis.needs_processing() {
        return None;
    }

    let action = Action::for_analysis(&analysis);
    let (generated, used_fallback) = generate_or_fallback(oracle, analysis.body(), filename);
    let (existing, body) = analysis.into_parts();
    let merged = merge(&existing, &generated.title, &generated.description);

    Some(PlannedRewrite {
        action,
        frontmatter: serialize(&merged),
        body,
        generated,
        used_fallback,
    })
}

/// Process a single file end to end
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn process_file(ctx: &RunContext, path: &Path) -> ProcessingOutcome {
    let start = Instant::now();
    let filename = display_name(path);

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to read file");
            return ProcessingOutcome::failed(path, Action::Error, format!("failed to read: {e}"));
        }
    };

    let analysis = analyze(&text);
    tracing::info!(
        frontmatter = analysis.has_frontmatter(),
        title = analysis.has_title(),
        description = analysis.has_description(),
        needs_processing = analysis.needs_processing(),
        "analyzed"
    );

    let had_title = analysis.has_title();
    let had_description = analysis.has_description();

    let Some(plan) = plan_rewrite(ctx.oracle(), analysis, &filename) else {
        tracing::info!("already has complete frontmatter");
        return ProcessingOutcome::new(path, Action::Skipped);
    };

    if !ctx.is_dry_run() {
        if let Err(e) = rewrite(path, &plan.frontmatter, &plan.body) {
            tracing::error!(error = %e, "failed to update file");
            return ProcessingOutcome::failed(path, Action::FailedWrite, e.to_string());
        }
    }

    trace_time!(start, "process_file");
    tracing::info!(action = %plan.action, dry_run = ctx.is_dry_run(), "updated");

    let mut outcome = ProcessingOutcome::new(path, plan.action);
    outcome.used_fallback = plan.used_fallback;
    if !had_title {
        outcome.generated_title = Some(plan.generated.title);
    }
    if !had_description {
        outcome.generated_description = Some(plan.generated.description);
    }
    outcome
}

/// Process every path in order, stopping early only on interrupt
pub fn run(ctx: &RunContext, paths: &[PathBuf]) -> RunSummary {
    let mut summary = RunSummary {
        dry_run: ctx.is_dry_run(),
        ..RunSummary::default()
    };

    for (i, path) in paths.iter().enumerate() {
        if ctx.is_interrupted() {
            tracing::warn!(remaining = paths.len() - i, "interrupted, stopping");
            summary.interrupted = true;
            break;
        }
        tracing::debug!(current = i + 1, total = paths.len(), "processing");
        summary.outcomes.push(process_file(ctx, path));
    }

    tracing::info!(
        processed = summary.processed().count(),
        skipped = summary.skipped().count(),
        failed = summary.failed_count(),
        "run complete"
    );
    summary
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FrontfillError, Result};
    use crate::oracle::MockOracle;
    use tempfile::tempdir;

    struct FailingOracle;

    impl ContentOracle for FailingOracle {
        fn name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _body: &str, _filename_hint: &str) -> Result<GeneratedContent> {
            Err(FrontfillError::oracle("model unavailable"))
        }
    }

    fn hello_oracle() -> Box<dyn ContentOracle> {
        Box::new(MockOracle::default().with_response(
            "hello.md",
            "Hello Guide",
            "A short guide about hello.",
        ))
    }

    #[test]
    fn test_creates_frontmatter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "# Hello\nBody text.\n").unwrap();

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert!(outcome.success);
        assert_eq!(outcome.action, Action::CreatedFrontmatter);
        assert_eq!(outcome.generated_title.as_deref(), Some("Hello Guide"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: Hello Guide\ndescription: A short guide about hello.\n---\n\n# Hello\nBody text.\n"
        );
    }

    #[test]
    fn test_adds_description_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "---\ntitle: Existing\n---\nBody\n").unwrap();

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert_eq!(outcome.action, Action::AddedDescription);
        assert_eq!(outcome.generated_title, None);
        assert_eq!(
            outcome.generated_description.as_deref(),
            Some("A short guide about hello.")
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: Existing\ndescription: A short guide about hello.\n---\n\nBody\n"
        );
    }

    #[test]
    fn test_complete_file_is_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.md");
        let original = "---\ntitle: T\ndescription: D\nauthor: A\n---\nBody\n";
        fs::write(&path, original).unwrap();

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert!(outcome.success);
        assert_eq!(outcome.action, Action::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_malformed_yaml_generates_both() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "---\n: : :\n---\nBody\n").unwrap();

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert_eq!(outcome.action, Action::AddedTitleAndDescription);
        assert!(outcome.generated_title.is_some());
        assert!(outcome.generated_description.is_some());
        assert!(fs::read_to_string(&path)
            .unwrap()
            .starts_with("---\ntitle: Hello Guide\ndescription: A short guide about hello.\n---\n"));
    }

    #[test]
    fn test_second_run_is_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "---\nauthor: A\ntags: [x, y]\n---\n\n# Notes\n\nSome notes.\n").unwrap();
        let ctx = RunContext::new(Box::new(MockOracle::default()));

        let first = process_file(&ctx, &path);
        assert_eq!(first.action, Action::AddedTitleAndDescription);
        let after_first = fs::read_to_string(&path).unwrap();

        let second = process_file(&ctx, &path);
        assert_eq!(second.action, Action::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);

        let analysis = analyze(&after_first);
        assert_eq!(
            analysis.frontmatter().keys().collect::<Vec<_>>(),
            vec!["author", "tags", "title", "description"]
        );
        assert_eq!(analysis.body(), "# Notes\n\nSome notes.\n");
    }

    #[test]
    fn test_oracle_failure_uses_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api_reference.md");
        fs::write(&path, "Endpoints.\n").unwrap();

        let outcome = process_file(&RunContext::new(Box::new(FailingOracle)), &path);

        assert!(outcome.success);
        assert!(outcome.used_fallback);
        assert_eq!(
            outcome.generated_title.as_deref(),
            Some("Api Reference Documentation")
        );
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("description: Documentation and information about api reference\n"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "# Hello\n").unwrap();

        let ctx = RunContext::new(hello_oracle()).with_dry_run(true);
        let outcome = process_file(&ctx, &path);

        assert_eq!(outcome.action, Action::CreatedFrontmatter);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hello\n");
    }

    #[test]
    fn test_read_only_file_is_failed_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "# Hello\n").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert!(!outcome.success);
        assert_eq!(outcome.action, Action::FailedWrite);
        assert!(outcome.error_message.unwrap().contains("read-only"));
        assert_eq!(outcome.generated_title, None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hello\n");
    }

    #[test]
    fn test_unreadable_file_is_error_outcome() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let outcome = process_file(&RunContext::new(hello_oracle()), &path);

        assert!(!outcome.success);
        assert_eq!(outcome.action, Action::Error);
        assert!(outcome.error_message.unwrap().contains("failed to read"));
    }

    #[test]
    fn test_run_continues_past_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("hello.md");
        let done = dir.path().join("done.md");
        fs::write(&good, "# Hello\n").unwrap();
        fs::write(&done, "---\ntitle: T\ndescription: D\n---\n").unwrap();
        let missing = dir.path().join("missing.md");

        let ctx = RunContext::new(hello_oracle());
        let summary = run(&ctx, &[missing, good, done]);

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.processed().count(), 1);
        assert_eq!(summary.skipped().count(), 1);
        assert!(!summary.is_success());
        assert!(!summary.interrupted);
    }

    #[test]
    fn test_run_stops_when_interrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.md");
        fs::write(&path, "# Hello\n").unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let ctx = RunContext::new(hello_oracle()).with_interrupt_flag(flag);
        let summary = run(&ctx, &[path.clone()]);

        assert!(summary.interrupted);
        assert_eq!(summary.total(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hello\n");
    }

    #[test]
    fn test_plan_round_trips_existing_keys() {
        let analysis = analyze("---\nauthor: A\nweight: 3\n---\nBody\n");
        let oracle = MockOracle::default().with_response("x.md", "T", "D");
        let plan = plan_rewrite(&oracle, analysis, "x.md").unwrap();

        let back = analyze(&plan.content());
        assert_eq!(back.frontmatter().get_str("title"), Some("T"));
        assert_eq!(back.frontmatter().get_str("description"), Some("D"));
        assert_eq!(back.frontmatter().get_str("author"), Some("A"));
        assert!(back.frontmatter().get("weight").is_some());
        assert_eq!(back.body(), "Body\n");
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Action::AddedTitleAndDescription.to_string(), "added-title-and-description");
        assert_eq!(
            serde_json::to_value(Action::CreatedFrontmatter).unwrap(),
            "created-frontmatter"
        );
    }
}
