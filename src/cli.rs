//! CLI argument parsing for frontfill

use std::path::PathBuf;

use clap::Parser;

use frontfill_core::config::{ConfigLayer, OracleKind};
pub use frontfill_core::format::OutputFormat;

/// Fill in missing `title` and `description` frontmatter in Markdown files
#[derive(Parser, Debug)]
#[command(name = "frontfill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the Markdown files
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Descend into subdirectories
    #[arg(long, short)]
    pub recursive: bool,

    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Use the offline mock oracle (shorthand for --oracle mock)
    #[arg(long, conflicts_with = "oracle")]
    pub mock: bool,

    /// Content oracle: llm or mock
    #[arg(long, value_parser = parse_oracle)]
    pub oracle: Option<OracleKind>,

    /// Model name for the llm oracle
    #[arg(long)]
    pub model: Option<String>,

    /// Config file to use instead of <path>/.frontfill.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum words in a generated title
    #[arg(long)]
    pub max_title_words: Option<usize>,

    /// Maximum words in a generated description
    #[arg(long)]
    pub max_description_words: Option<usize>,

    /// Output format
    #[arg(long, value_parser = parse_format, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress the human-readable summary
    #[arg(long, short)]
    pub quiet: bool,

    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Log filter, e.g. `warn` or `frontfill_core=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Settings given on the command line, as the top config layer
    pub fn config_overrides(&self) -> ConfigLayer {
        let oracle = if self.mock {
            Some(OracleKind::Mock)
        } else {
            self.oracle
        };

        ConfigLayer {
            oracle,
            model: self.model.clone(),
            max_title_words: self.max_title_words,
            max_description_words: self.max_description_words,
            recursive: self.recursive.then_some(true),
            ..ConfigLayer::default()
        }
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: frontfill_core::error::FrontfillError| e.to_string())
}

fn parse_oracle(s: &str) -> Result<OracleKind, String> {
    s.parse().map_err(|e: frontfill_core::error::FrontfillError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["frontfill"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Human);
        assert_eq!(cli.config_overrides(), ConfigLayer::default());
    }

    #[test]
    fn test_mock_flag_selects_mock_oracle() {
        let cli = Cli::try_parse_from(["frontfill", "docs", "--mock", "-r"]).unwrap();
        let layer = cli.config_overrides();
        assert_eq!(layer.oracle, Some(OracleKind::Mock));
        assert_eq!(layer.recursive, Some(true));
    }

    #[test]
    fn test_mock_conflicts_with_oracle() {
        assert!(Cli::try_parse_from(["frontfill", "--mock", "--oracle", "llm"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = Cli::try_parse_from(["frontfill", "--format", "records"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
