//! Config command - show current configuration

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::config::{Config, IndexConfig, LimitsConfig, SearchConfig};
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// User config file location (may not exist)
    pub config_file: Option<String>,
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub limits: LimitsConfig,
}

/// Execute the config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let response = ConfigResponse {
        config_file: Config::user_config_file().map(|p| p.to_string_lossy().into_owned()),
        index: config.index.clone(),
        search: config.search.clone(),
        limits: config.limits.clone(),
    };

    match format {
        OutputFormat::Human => {
            output::print_header("Configuration:");
            if let Some(path) = &response.config_file {
                println!("  config_file: {}", colors::dim(path));
            }
            println!("  index:");
            println!("    url: {}", response.index.url);
            println!("    works_index: {}", response.index.works_index);
            println!("    institutions_index: {}", response.index.institutions_index);
            println!("    institution_prefix: {}", response.index.institution_prefix);
            println!("    tie_break_field: {}", response.index.tie_break_field);
            println!("  search:");
            println!("    page_size: {}", response.search.page_size);
            println!("    max_page_size: {}", response.search.max_page_size);
            println!(
                "    highlight_tags: {} {}",
                response.search.highlight_pre_tag, response.search.highlight_post_tag
            );
            println!("    max_fragments: {}", response.search.max_fragments);
            println!("  limits:");
            println!(
                "    request_timeout_ms: {}",
                response.limits.request_timeout_ms
            );
        }
        OutputFormat::Json => output::print_output(&response, format),
    }

    Ok(())
}
