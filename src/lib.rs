//! # Organiser
//!
//! Core of a construction-industry organising CRM: projects, employers,
//! workers, site visits and a role-aware dashboard, backed by a hosted
//! database/auth service.
//!
//! ## Features
//!
//! - **Backend client**: typed row-level reads with fail-fast credentials
//! - **Deadlines**: any future can be raced against a labelled timeout
//! - **Roles**: allow-listed profile roles, memoized per user
//! - **Dashboard**: session and role driven redirects, cancellable per view
//! - **Pages**: cached listing queries with loading fallbacks
//! - **Map key function**: HTTP endpoint with CORS preflight
//!
//! ## Modules
//!
//! - [`backend`]: REST client, query builder, sessions
//! - [`roles`]: role resolution and memoization
//! - [`dashboard`]: redirect state machine
//! - [`pages`]: listing page loaders
//! - [`presentation`]: badges, status summaries, theme preference
//! - [`api`]: map-key function server
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use organiser::backend::{BackendClient, StaticSession};
//! use organiser::dashboard::{DashboardController, RecordingNavigator};
//! use organiser::roles::RoleResolver;
//! use organiser::scope::ViewScope;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fails fast without ORGANISER_BACKEND_URL / ORGANISER_BACKEND_ANON_KEY
//!     let client = Arc::new(BackendClient::from_env()?);
//!
//!     let roles = Arc::new(RoleResolver::new(client.clone()));
//!     let navigator = Arc::new(RecordingNavigator::new());
//!     let mut dashboard =
//!         DashboardController::new(Arc::new(StaticSession(None)), roles, navigator.clone());
//!
//!     let scope = ViewScope::new();
//!     let route = dashboard.check(&scope).await;
//!     println!("Redirect: {:?}", route);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod pages;
pub mod presentation;
pub mod roles;
pub mod scope;
pub mod timeout;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use backend::{
    AuthUser, BackendClient, BackendError, BackendResult, Select, Session, SessionSource,
    StaticSession, TokenSession,
};

pub use config::{
    BackendConfig, BackendCredentials, Config, ConfigDiscovery, ConfigError, LoggingConfig,
};

pub use dashboard::{DashboardController, DashboardState, Navigator, RecordingNavigator, Route};

pub use models::{Employer, JobSite, Project, SiteVisit, Worker};

pub use pages::{LoadState, PageContext, PageView, QueryCache};

pub use presentation::{
    badge_color, BadgeColor, FileStore, MemoryStore, PreferenceStore, Theme, ThemeSettings,
};

pub use roles::{ProfileSource, Role, RoleResolver};

pub use scope::{ScopeGuard, ViewScope};

pub use timeout::{with_timeout, TimeoutError};
