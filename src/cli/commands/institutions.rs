//! Institutions command - list catalog names usable as filters

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::index::filter_buckets;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the institutions command
#[derive(Args, Debug)]
pub struct InstitutionsArgs {
    /// Only show names containing this text (case-insensitive)
    #[arg(long, short = 'c')]
    pub contains: Option<String>,

    /// Maximum number of names to show
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Read institutions from a local OpenAlex works file
    /// instead of Elasticsearch
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,
}

/// Catalog entry
#[derive(Debug, Serialize)]
pub struct InstitutionItem {
    pub name: String,
    pub works: u64,
}

/// Institutions response
#[derive(Debug, Serialize)]
pub struct InstitutionsOutput {
    /// Catalog size before filtering
    pub total: usize,
    pub matched: usize,
    pub institutions: Vec<InstitutionItem>,
}

/// Execute the institutions command
pub async fn execute(
    args: InstitutionsArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let buckets = services.catalog.aggregate().await?;
    let matched = filter_buckets(&buckets, args.contains.as_deref().unwrap_or_default());

    let response = InstitutionsOutput {
        total: buckets.len(),
        matched: matched.len(),
        institutions: matched
            .iter()
            .take(args.limit)
            .map(|b| InstitutionItem {
                name: b.key.clone(),
                works: b.count,
            })
            .collect(),
    };

    match format {
        OutputFormat::Human => {
            if response.institutions.is_empty() {
                println!("No institutions found");
                return Ok(());
            }

            output::print_header(&format!(
                "Institutions ({} of {}):",
                response.institutions.len(),
                response.matched
            ));
            for item in &response.institutions {
                println!(
                    "  {:>6}  {}",
                    colors::number(&item.works.to_string()),
                    item.name
                );
            }
        }
        OutputFormat::Json => output::print_output(&response, format),
    }

    Ok(())
}
