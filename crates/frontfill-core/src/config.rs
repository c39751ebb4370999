//! Configuration for frontfill
//!
//! Settings are layered, later layers winning:
//! built-in defaults, the global config (`~/.config/frontfill/config.toml`),
//! the project config (`.frontfill.toml` in the scanned directory, or an
//! explicit `--config` file), environment variables, then CLI flags.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bail_invalid;
use crate::error::{FrontfillError, Result};
use crate::oracle::{LlmSettings, OracleLimits};
use crate::scan::ScanOptions;

const CONFIG_DIR: &str = "frontfill";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "FRONTFILL_CONFIG_DIR";

/// Name of the per-directory config file
pub const PROJECT_CONFIG_FILE: &str = ".frontfill.toml";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Directories never descended into when scanning recursively
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
    ".env",
    "dist",
    "build",
];

/// Which oracle generates missing content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Language-model API call (default)
    #[default]
    Llm,
    /// Deterministic local stub
    Mock,
}

impl FromStr for OracleKind {
    type Err = FrontfillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "llm" => Ok(OracleKind::Llm),
            "mock" => Ok(OracleKind::Mock),
            other => Err(FrontfillError::invalid_value(
                "oracle (expected: llm or mock)",
                other,
            )),
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleKind::Llm => write!(f, "llm"),
            OracleKind::Mock => write!(f, "mock"),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub oracle: OracleKind,
    pub model: String,
    pub base_url: String,
    /// Only ever read from the environment
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub max_title_words: usize,
    pub max_description_words: usize,
    pub max_body_chars: usize,
    pub recursive: bool,
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let limits = OracleLimits::default();
        Self {
            oracle: OracleKind::default(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_title_words: limits.max_title_words,
            max_description_words: limits.max_description_words,
            max_body_chars: limits.max_body_chars,
            recursive: false,
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            extensions: vec!["md".to_string()],
        }
    }
}

/// One layer of optional settings, as read from a TOML file or built from
/// CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub oracle: Option<OracleKind>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_title_words: Option<usize>,
    pub max_description_words: Option<usize>,
    pub max_body_chars: Option<usize>,
    pub recursive: Option<bool>,
    pub exclude: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
}

impl ConfigLayer {
    /// Load a layer from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FrontfillError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| FrontfillError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load a layer if the file exists, otherwise an empty layer
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn apply(self, config: &mut Config) {
        if let Some(oracle) = self.oracle {
            config.oracle = oracle;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if let Some(words) = self.max_title_words {
            config.max_title_words = words;
        }
        if let Some(words) = self.max_description_words {
            config.max_description_words = words;
        }
        if let Some(chars) = self.max_body_chars {
            config.max_body_chars = chars;
        }
        if let Some(recursive) = self.recursive {
            config.recursive = recursive;
        }
        if let Some(exclude) = self.exclude {
            config.exclude = exclude;
        }
        if let Some(extensions) = self.extensions {
            config.extensions = extensions;
        }
    }
}

impl Config {
    /// Path of the global config file
    pub fn global_path() -> Result<PathBuf> {
        // Allow environment variable override for testing
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    FrontfillError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Resolve configuration for a run over `dir`.
    ///
    /// `explicit` replaces the project config lookup and must exist.
    /// `overrides` comes from the command line.
    pub fn resolve(dir: &Path, explicit: Option<&Path>, overrides: ConfigLayer) -> Result<Self> {
        let mut config = Config::default();

        match Self::global_path() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "global config");
                ConfigLayer::load_optional(&path)?.apply(&mut config);
            }
            Err(e) => tracing::debug!(error = %e, "skipping global config"),
        }

        let project = match explicit {
            Some(path) => ConfigLayer::load(path)?,
            None => ConfigLayer::load_optional(&dir.join(PROJECT_CONFIG_FILE))?,
        };
        project.apply(&mut config);

        config.apply_env(|key| std::env::var(key).ok());
        overrides.apply(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in practice.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("LLM_API_KEY").or_else(|| non_empty("ANTHROPIC_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = non_empty("LLM_BASE_URL") {
            self.base_url = base_url;
        }
    }

    /// Reject values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_title_words == 0 {
            bail_invalid!("max_title_words", self.max_title_words);
        }
        if self.max_description_words == 0 {
            bail_invalid!("max_description_words", self.max_description_words);
        }
        if self.max_body_chars == 0 {
            bail_invalid!("max_body_chars", self.max_body_chars);
        }
        if self.timeout_seconds == 0 {
            bail_invalid!("timeout_seconds", self.timeout_seconds);
        }
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            bail_invalid!("extensions", "(empty)");
        }
        Ok(())
    }

    pub fn limits(&self) -> OracleLimits {
        OracleLimits {
            max_title_words: self.max_title_words,
            max_description_words: self.max_description_words,
            max_body_chars: self.max_body_chars,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            extensions: self.extensions.clone(),
        }
    }

    /// Settings for the language-model oracle; fails without an API key
    pub fn llm_settings(&self) -> Result<LlmSettings> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            FrontfillError::MissingConfig(
                "LLM_API_KEY (or ANTHROPIC_API_KEY) must be set to use the llm oracle; \
                 pass --mock to run without one"
                    .to_string(),
            )
        })?;

        Ok(LlmSettings {
            api_key,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}
