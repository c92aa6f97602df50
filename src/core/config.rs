//! Configuration management for scholar-search.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for the config directory
pub const APP_NAME: &str = "scholar-search";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Index connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Base URL of the Elasticsearch cluster
    #[serde(default = "default_url")]
    pub url: String,

    /// Index (or pattern) holding the works
    #[serde(default = "default_works_index")]
    pub works_index: String,

    /// Index holding institutions (catalog aggregation)
    #[serde(default = "default_institutions_index")]
    pub institutions_index: String,

    /// Name prefix restricting the institution catalog
    #[serde(default = "default_institution_prefix")]
    pub institution_prefix: String,

    /// Sortable unique field used to break relevance ties
    #[serde(default = "default_tie_break_field")]
    pub tie_break_field: String,
}

/// Search session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound for page_size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Markup inserted before a highlighted term
    #[serde(default = "default_pre_tag")]
    pub highlight_pre_tag: String,

    /// Markup inserted after a highlighted term
    #[serde(default = "default_post_tag")]
    pub highlight_post_tag: String,

    /// Highlight fragments kept per result
    #[serde(default = "default_max_fragments")]
    pub max_fragments: usize,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Deadline for a single index round trip in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

// Default value functions
fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_works_index() -> String {
    "openalex_works*".to_string()
}

fn default_institutions_index() -> String {
    "openalex_institutions".to_string()
}

fn default_institution_prefix() -> String {
    "University".to_string()
}

fn default_tie_break_field() -> String {
    "id.keyword".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

fn default_pre_tag() -> String {
    "<mark>".to_string()
}

fn default_post_tag() -> String {
    "</mark>".to_string()
}

fn default_max_fragments() -> usize {
    2
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            works_index: default_works_index(),
            institutions_index: default_institutions_index(),
            institution_prefix: default_institution_prefix(),
            tie_break_field: default_tie_break_field(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            highlight_pre_tag: default_pre_tag(),
            highlight_post_tag: default_post_tag(),
            max_fragments: default_max_fragments(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SearchError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default location of the user config file
    pub fn user_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// File lookup order:
    /// 1. SCHOLAR_CONFIG env var
    /// 2. User config file (~/.config/scholar-search/config.toml)
    /// 3. ./scholar-search.toml
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("SCHOLAR_CONFIG") {
            Self::from_file(config_path)?
        } else {
            match Self::user_config_file() {
                Some(path) if path.exists() => Self::from_file(path)?,
                _ if Path::new("scholar-search.toml").exists() => {
                    Self::from_file("scholar-search.toml")?
                }
                _ => Self::default(),
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(url) = env::var("SCHOLAR_INDEX_URL") {
            self.index.url = url;
        }
        if let Ok(index) = env::var("SCHOLAR_WORKS_INDEX") {
            self.index.works_index = index;
        }
        if let Ok(index) = env::var("SCHOLAR_INSTITUTIONS_INDEX") {
            self.index.institutions_index = index;
        }

        if let Ok(page_size) = env::var("SCHOLAR_PAGE_SIZE") {
            if let Ok(size) = page_size.parse() {
                self.search.page_size = size;
            }
        }

        if let Ok(timeout) = env::var("SCHOLAR_REQUEST_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.limits.request_timeout_ms = t;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.index.url.trim().is_empty() {
            return Err(SearchError::ConfigError(
                "Index URL must not be empty".to_string(),
            ));
        }

        if self.index.works_index.trim().is_empty() {
            return Err(SearchError::ConfigError(
                "Works index must not be empty".to_string(),
            ));
        }

        if self.index.tie_break_field.trim().is_empty() {
            return Err(SearchError::ConfigError(
                "Tie-break field must not be empty".to_string(),
            ));
        }

        if self.search.page_size == 0 {
            return Err(SearchError::ConfigError(
                "Page size must be non-zero".to_string(),
            ));
        }

        if self.search.page_size > self.search.max_page_size {
            return Err(SearchError::ConfigError(
                "Page size cannot exceed max page size".to_string(),
            ));
        }

        if self.limits.request_timeout_ms == 0 {
            return Err(SearchError::ConfigError(
                "Request timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::debug!("Configuration loaded:");
        tracing::debug!("  Index URL: {}", self.index.url);
        tracing::debug!("  Works index: {}", self.index.works_index);
        tracing::debug!("  Institutions index: {}", self.index.institutions_index);
        tracing::debug!("  Tie-break field: {}", self.index.tie_break_field);
        tracing::debug!("  Page size: {}", self.search.page_size);
        tracing::debug!("  Max fragments: {}", self.search.max_fragments);
        tracing::debug!("  Request timeout: {}ms", self.limits.request_timeout_ms);
    }
}
