//! Core domain logic (transport-agnostic)
//!
//! This module contains all search logic that is independent
//! of how results are presented.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Filter criteria and search results
//! - **index**: Index query surface (Elasticsearch, local Tantivy)
//! - **search**: Query building, cursors, highlighting and sessions
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod index;
pub mod search;
pub mod services;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Result, SearchError};
pub use services::Services;
