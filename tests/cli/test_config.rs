//! Tests for show-config and completions CLI commands

use crate::cli::test_helpers::create_cli_test_services;
use clap::Parser;
use clap_complete::Shell;
use scholar_search::cli::commands::completions::write_completions;
use scholar_search::cli::commands::config::{execute, ConfigArgs};
use scholar_search::cli::{Cli, Commands, OutputFormat};

/// Test show-config in both formats
#[tokio::test]
async fn test_show_config() {
    let services = create_cli_test_services();
    assert!(execute(ConfigArgs {}, &services, OutputFormat::Human).await.is_ok());
    assert!(execute(ConfigArgs {}, &services, OutputFormat::Json).await.is_ok());
}

/// Test completion script generation
#[test]
fn test_completions_bash() {
    let mut out: Vec<u8> = Vec::new();
    write_completions(Shell::Bash, &mut out);
    let script = String::from_utf8(out).unwrap();
    assert!(script.contains("scholar"));
    assert!(script.contains("institutions"));
}

/// Test argument parsing
#[test]
fn test_parse_search_arguments() {
    let cli = Cli::try_parse_from([
        "scholar",
        "--format",
        "json",
        "search",
        "--abstract",
        "neural networks",
        "--author",
        "Hinton",
        "--pages",
        "3",
        "--back",
        "1",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    let Commands::Search(args) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.search_term.as_deref(), Some("neural networks"));
    assert_eq!(args.author.as_deref(), Some("Hinton"));
    assert!(args.institution.is_none());
    assert_eq!(args.pages, 3);
    assert_eq!(args.back, 1);
    assert!(args.fixture.is_none());
}

/// Test default format and institutions arguments
#[test]
fn test_parse_institutions_defaults() {
    let cli = Cli::try_parse_from(["scholar", "institutions", "-c", "tokyo"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Human);
    let Commands::Institutions(args) = cli.command else {
        panic!("expected institutions command");
    };
    assert_eq!(args.contains.as_deref(), Some("tokyo"));
    assert_eq!(args.limit, 20);
}
