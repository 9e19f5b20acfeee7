//! Listing Pages
//!
//! Each page issues one read query with a fixed column set, keyed by a cache
//! key, and renders the rows or a fallback string.
//!
//! - [`projects`]: projects with their primary job site
//! - [`employers`]: employers and their type
//! - [`workers`]: worker picker for one employer
//! - [`site_visits`]: site visits with a status summary
//!
//! Loads go through a [`PageView`], which owns the page's [`LoadState`] and
//! ignores results that arrive after the view's scope was cancelled.

mod cache;
pub mod employers;
pub mod projects;
pub mod site_visits;
pub mod workers;

pub use cache::{QueryCache, DEFAULT_STALE_AFTER};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendClient, BackendResult};
use crate::config::BackendConfig;
use crate::scope::ViewScope;
use crate::timeout::with_timeout;

/// Fallback shown while a page is loading
pub const LOADING_TEXT: &str = "Loading...";

/// Load state of a page
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Render loaded data with `render`, or the fallback text for other states
    pub fn render_with(&self, render: impl FnOnce(&T) -> Vec<String>) -> Vec<String> {
        match self {
            LoadState::Loading => vec![LOADING_TEXT.to_string()],
            LoadState::Loaded(value) => render(value),
            LoadState::Failed(message) => vec![format!("Error: {}", message)],
        }
    }
}

/// Everything a page needs to query the backend
#[derive(Clone)]
pub struct PageContext {
    pub client: Arc<BackendClient>,
    pub cache: Arc<QueryCache>,
    /// Deadline for each page query
    pub query_timeout_ms: u64,
}

impl PageContext {
    pub fn new(client: Arc<BackendClient>, config: &BackendConfig) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new(Duration::from_secs(config.cache_stale_secs))),
            query_timeout_ms: config.query_timeout_ms,
        }
    }

    /// Run a page query through the cache, bounded by the query deadline
    pub async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> BackendResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        let ms = self.query_timeout_ms;
        self.cache
            .get_or_fetch(key, || async move { with_timeout(fetch(), ms, Some(key)).await? })
            .await
    }
}

/// A page bound to a view scope
pub struct PageView<T> {
    scope: ViewScope,
    state: LoadState<T>,
}

impl<T> PageView<T> {
    pub fn new(scope: ViewScope) -> Self {
        Self {
            scope,
            state: LoadState::Loading,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Run `load` and record its outcome, unless the scope is cancelled first
    pub async fn load<F>(&mut self, load: F) -> &LoadState<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        match self.scope.run(load).await {
            Some(Ok(value)) => self.state = LoadState::Loaded(value),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Page load failed");
                self.state = LoadState::Failed(e.to_string());
            }
            None => tracing::debug!("Page load superseded"),
        }
        &self.state
    }
}
