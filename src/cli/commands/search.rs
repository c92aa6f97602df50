//! Search command - run a search session and walk its pages

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::error::SearchError;
use crate::core::search::{SearchSession, SessionState};
use crate::core::services::Services;
use crate::core::types::FilterCriteria;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Visible characters shown per snippet
const SNIPPET_CHARS: usize = 300;

/// Arguments for the search command
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free text matched against abstracts
    #[arg(long = "abstract", short = 'q', value_name = "TEXT")]
    pub search_term: Option<String>,

    /// Free text matched against author names
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Institution name (use `institutions` to list valid names)
    #[arg(long, short = 'i')]
    pub institution: Option<String>,

    /// Number of pages to walk forward, starting at page 1
    #[arg(long, short = 'p', default_value = "1")]
    pub pages: usize,

    /// Number of pages to walk back after walking forward
    #[arg(long, short = 'b', default_value = "0")]
    pub back: usize,

    /// Search a local OpenAlex works file (JSON array or JSON lines)
    /// instead of Elasticsearch
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,
}

impl SearchArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_term: self.search_term.clone(),
            author_name: self.author.clone(),
            institution_name: self.institution.clone(),
        }
    }
}

/// One result row
#[derive(Debug, Serialize)]
pub struct ResultItem {
    pub rank: usize,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub authors: Vec<String>,
    pub snippets: Vec<String>,
    pub score: f64,
}

/// One visited page
#[derive(Debug, Serialize)]
pub struct PageOutput {
    pub page: usize,
    pub total_pages: usize,
    pub total_hits: u64,
    pub elapsed_millis: f64,
    pub results: Vec<ResultItem>,
}

impl From<&SessionState> for PageOutput {
    fn from(state: &SessionState) -> Self {
        let offset = (state.page_index - 1) * state.page_size;
        Self {
            page: state.page_index,
            total_pages: state.total_pages,
            total_hits: state.total_hits,
            elapsed_millis: state.elapsed_millis,
            results: state
                .window
                .iter()
                .enumerate()
                .map(|(i, r)| ResultItem {
                    rank: offset + i + 1,
                    id: r.id.clone(),
                    title: r.display_name.clone(),
                    publication_date: r.publication_date.map(|d| d.to_string()),
                    doi: r.doi.clone(),
                    authors: r.authors.clone(),
                    snippets: r.display_snippets().into_iter().map(str::to_string).collect(),
                    score: r.sort_key.relevance_score,
                })
                .collect(),
        }
    }
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponseOutput {
    pub criteria: FilterCriteria,
    pub pages: Vec<PageOutput>,
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let criteria = args.criteria();
    let session = services.create_session();

    let state = match session.search(criteria.clone()).await {
        Ok(state) => state,
        Err(SearchError::EmptyQueryNotExecuted) => {
            return Err("Enter an abstract term, an author or an institution".into());
        }
        Err(e) => return Err(e.into()),
    };

    let pages = walk(&session, state, args.pages, args.back).await?;
    let output = SearchResponseOutput { criteria, pages };

    match format {
        OutputFormat::Human => {
            let pre = &services.config.search.highlight_pre_tag;
            let post = &services.config.search.highlight_post_tag;

            let Some(first) = output.pages.first() else {
                return Ok(());
            };
            if first.total_hits == 0 {
                println!("No works found");
                return Ok(());
            }

            for page in &output.pages {
                print_page(page, pre, post);
            }

            let visited = output.pages.len();
            if visited < args.pages.max(1) + args.back {
                output::print_warning(&format!(
                    "Stopped after {visited} page(s): no further pages in that direction"
                ));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Walk `pages - 1` pages forward then `back` pages backward.
///
/// Stops early at either end of the result list.
async fn walk(
    session: &SearchSession,
    first: SessionState,
    pages: usize,
    back: usize,
) -> Result<Vec<PageOutput>, SearchError> {
    let mut visited = vec![PageOutput::from(&first)];
    let mut state = first;

    for _ in 1..pages {
        if !state.has_next() {
            break;
        }
        state = session.navigate_next().await?;
        visited.push(PageOutput::from(&state));
    }

    for _ in 0..back {
        if !state.has_previous() {
            break;
        }
        state = session.navigate_previous().await?;
        visited.push(PageOutput::from(&state));
    }

    Ok(visited)
}

fn print_page(page: &PageOutput, pre: &str, post: &str) {
    output::print_header(&format!(
        "Page {} of {} ({} works, {})",
        page.page,
        page.total_pages,
        page.total_hits,
        output::format_duration_ms(page.elapsed_millis)
    ));
    println!();

    for result in &page.results {
        println!(
            "[{}] {} {}",
            colors::rank(&result.rank.to_string()),
            colors::title(&result.title),
            colors::dim(&format!("(score: {:.2})", result.score))
        );

        let mut meta = Vec::new();
        if let Some(date) = &result.publication_date {
            meta.push(date.clone());
        }
        if !result.authors.is_empty() {
            meta.push(output::truncate_chars(&result.authors.join(", "), 80));
        }
        if !meta.is_empty() {
            println!("    {}", colors::dim(&meta.join(" | ")));
        }
        if let Some(doi) = &result.doi {
            println!("    {}", colors::link(doi));
        }

        for snippet in &result.snippets {
            println!(
                "    {}",
                output::render_highlight_truncated(snippet, pre, post, SNIPPET_CHARS)
            );
        }
        println!();
    }
}
