//! Hosted Backend
//!
//! Typed access to the hosted backend: a REST client for row-level reads,
//! a query builder, and session lookup against the auth service.
//!
//! ## Architecture
//!
//! - **Client**: `BackendClient`, built from validated credentials
//! - **Query**: `Select`, one table plus an optional embedded relation
//! - **Session**: `SessionSource` implementations for the dashboard

mod client;
mod error;
mod query;
mod session;

pub use client::{AuthUser, BackendClient};
pub use error::{BackendError, BackendResult};
pub use query::{Order, Select};
pub use session::{Session, SessionSource, StaticSession, TokenSession};
