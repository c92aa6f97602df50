//! Unified service container for scholar-search
//!
//! Provides shared access to the index backend and the institution catalog.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::index::{Catalog, ElasticsearchIndex, IndexQueryService, LocalIndex};
use crate::core::search::{SearchSession, SessionSettings};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Query surface of the works index
    pub index: Arc<dyn IndexQueryService>,

    /// Institution name suggestions
    pub catalog: Arc<dyn Catalog>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services backed by the configured Elasticsearch cluster
    pub fn new(config: Config) -> Result<Self> {
        let timeout = Duration::from_millis(config.limits.request_timeout_ms);
        let backend = Arc::new(ElasticsearchIndex::new(&config.index, timeout)?);
        tracing::debug!("Using Elasticsearch backend at {}", config.index.url);

        Ok(Self::with_backend(config, backend.clone(), backend))
    }

    /// Create services backed by an in-process index over `works`
    pub fn with_local(config: Config, works: &[Value]) -> Result<Self> {
        let backend = Arc::new(LocalIndex::from_works(works)?);
        tracing::debug!("Using local index with {} document(s)", backend.num_docs());

        Ok(Self::with_backend(config, backend.clone(), backend))
    }

    /// Create services from explicit collaborators
    pub fn with_backend(
        config: Config,
        index: Arc<dyn IndexQueryService>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            index,
            catalog,
            config: Arc::new(config),
        }
    }

    /// Create a fresh search session
    ///
    /// Sessions are per-caller since each owns its own pagination state.
    pub fn create_session(&self) -> SearchSession {
        SearchSession::new(
            Arc::clone(&self.index),
            SessionSettings::from_config(&self.config),
        )
    }
}
