//! Run driver: config, discovery, oracle selection and processing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::cli::Cli;
use crate::commands::report;
use frontfill_core::config::{Config, OracleKind};
use frontfill_core::error::{FrontfillError, Result};
use frontfill_core::oracle::{ContentOracle, LlmOracle, MockOracle};
use frontfill_core::process::{self, RunContext};
use frontfill_core::scan::find_markdown_files;
use frontfill_core::trace_time;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let config = Config::resolve(&cli.path, cli.config.as_deref(), cli.config_overrides())?;
    debug!(oracle = %config.oracle, model = %config.model, "resolved config");
    trace_time!(start, "resolve_config");

    let files = find_markdown_files(&cli.path, &config.scan_options())?;
    trace_time!(start, "scan");

    if files.is_empty() {
        report::no_files(cli, &cli.path)?;
        return Ok(());
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
    }) {
        debug!(error = %e, "could not install interrupt handler");
    }

    let ctx = RunContext::new(build_oracle(&config)?)
        .with_dry_run(cli.dry_run)
        .with_interrupt_flag(interrupted);
    debug!(oracle = ctx.oracle().name(), files = files.len(), "starting run");

    let summary = process::run(&ctx, &files);
    trace_time!(start, "process");

    report::summary(cli, &summary)?;

    if summary.interrupted {
        return Err(FrontfillError::Interrupted);
    }
    if !summary.is_success() {
        return Err(FrontfillError::FilesFailed {
            failed: summary.failed_count(),
            total: summary.total(),
        });
    }
    Ok(())
}

fn build_oracle(config: &Config) -> Result<Box<dyn ContentOracle>> {
    let limits = config.limits();
    Ok(match config.oracle {
        OracleKind::Mock => Box::new(MockOracle::new(limits)),
        OracleKind::Llm => Box::new(LlmOracle::new(config.llm_settings()?, limits)),
    })
}
