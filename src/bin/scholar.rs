//! scholar - command-line search over scholarly works
//!
//! # Examples
//!
//! ```bash
//! # First page of works mentioning "neural networks"
//! scholar search --abstract "neural networks"
//!
//! # Walk three pages forward, then one back
//! scholar search --author "Hinton" --pages 3 --back 1
//!
//! # Institution names containing "tokyo"
//! scholar institutions --contains tokyo
//!
//! # Search a local works file instead of Elasticsearch
//! scholar search --abstract graphene --fixture works.jsonl
//! ```
//!
//! Logs go to stderr. Set `RUST_LOG` to change the level and
//! `SCHOLAR_LOG_FORMAT=json` for JSON lines.

use clap::Parser;
use scholar_search::cli::output::print_error;
use scholar_search::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scholar_search=info"));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if std::env::var("SCHOLAR_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
