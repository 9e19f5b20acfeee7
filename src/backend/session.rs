//! Sessions
//!
//! Where the signed-in user comes from. The dashboard only needs to know
//! whether a session exists and whose it is.

use async_trait::async_trait;
use std::sync::Arc;

use super::client::BackendClient;
use super::error::BackendResult;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

/// Source of the current session
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// The current session, or `None` when nobody is signed in
    async fn current_session(&self) -> BackendResult<Option<Session>>;
}

/// A fixed session, known up front
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<Session>);

#[async_trait]
impl SessionSource for StaticSession {
    async fn current_session(&self) -> BackendResult<Option<Session>> {
        Ok(self.0.clone())
    }
}

/// A bearer token validated against the auth service on every check
pub struct TokenSession {
    client: Arc<BackendClient>,
    token: Option<String>,
}

impl TokenSession {
    pub fn new(client: Arc<BackendClient>, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { client, token }
    }
}

#[async_trait]
impl SessionSource for TokenSession {
    async fn current_session(&self) -> BackendResult<Option<Session>> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };

        let user = self.client.get_user(token).await?;
        Ok(user.map(|user| Session {
            access_token: token.to_string(),
            user_id: user.id,
        }))
    }
}
