use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub altgraph: AltgraphConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Session-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct AltgraphConfig {
    /// Product file (`.csv` or `.json`) the graph is built from.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AltgraphConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            log_level: default_log_level(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Number of ranked alternatives returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
    #[serde(default = "default_tag_delimiter")]
    pub tag_delimiter: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            on_malformed: MalformedPolicy::default(),
            tag_delimiter: default_tag_delimiter(),
        }
    }
}

/// What the graph builder does with a row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// The first malformed row fails the whole build.
    #[default]
    Abort,
    /// Malformed rows are logged and left out of the graph.
    Skip,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/products.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_results() -> usize {
    crate::search::MAX_ALTERNATIVES
}

fn default_tag_delimiter() -> String {
    ";".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in ALTGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory (defaults apply when it is absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let explicit = std::env::var("ALTGRAPH_CONFIG").ok().map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// Load from an explicit path, or fall back to `./config.toml` / defaults.
    ///
    /// An explicitly named file must exist; the implicit `./config.toml` is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let config_str = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml_str(&config_str)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => {
                let default_path = Path::new("config.toml");
                if default_path.is_file() {
                    let config_str = std::fs::read_to_string(default_path)
                        .context("Failed to read config.toml")?;
                    Self::from_toml_str(&config_str).context("Failed to parse config.toml")?
                } else {
                    log::debug!("No config.toml found, using built-in defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text without validating it.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            anyhow::bail!("search.max_results must be greater than 0");
        }

        if self.search.max_results > crate::search::MAX_ALTERNATIVES {
            anyhow::bail!(
                "search.max_results must be at most {}, got {}",
                crate::search::MAX_ALTERNATIVES,
                self.search.max_results
            );
        }

        if self.ingest.tag_delimiter.chars().count() != 1 {
            anyhow::bail!(
                "ingest.tag_delimiter must be a single character, got {:?}",
                self.ingest.tag_delimiter
            );
        }

        Ok(())
    }

    /// Get the product data path
    pub fn data_path(&self) -> &Path {
        &self.altgraph.data_path
    }

    /// Tag delimiter as a char (validated to be exactly one character).
    pub fn tag_delimiter(&self) -> char {
        self.ingest.tag_delimiter.chars().next().unwrap_or(';')
    }
}
