//! scholar-search - Paginated search sessions over scholarly works
//!
//! Turns up to three free-text filters (abstract, author, institution)
//! into an index query and pages through the ranked results with
//! keyset cursors, so every page is stable and pages never overlap.
//!
//! # Architecture
//!
//! The codebase is organized into two main modules:
//!
//! - **core**: Domain logic (transport-agnostic)
//!   - config, error, types
//!   - index (Elasticsearch transport, local Tantivy index)
//!   - search (query builder, cursors, highlighter, session)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!   - search, institutions, show-config, completions
//!
//! # Key Features
//!
//! - Keyset pagination on `(score, id)` with a backward cursor stack
//! - Generation-stamped requests (stale responses are discarded)
//! - Two highlight fragments per result, abstract fallback
//! - Institution catalog for filter suggestions

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{Result, SearchError};
pub use crate::core::search::{Phase, SearchSession, SessionState};
pub use crate::core::services::Services;
pub use crate::core::types::*;
