//! Role Resolution
//!
//! Derives the signed-in user's application role from their profile row.
//! Only the roles in [`Role`] are recognised; anything else, and a missing
//! profile, resolves to no role. Outcomes are memoized per user id for a
//! short interval (60 seconds by default). Fetch errors are returned to the
//! caller and never memoized.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::backend::{BackendClient, BackendResult, Select};
use crate::models::Profile;

/// Default memo lifetime
pub const DEFAULT_ROLE_TTL: Duration = Duration::from_secs(60);

/// Application roles on the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Organiser,
    LeadOrganiser,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Organiser, Role::LeadOrganiser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organiser => "organiser",
            Role::LeadOrganiser => "lead_organiser",
        }
    }

    /// Parse a stored role; `None` for anything off the allow-list
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where profile roles are read from
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// The stored role for a user, if a profile row exists
    async fn fetch_profile_role(&self, user_id: &str) -> BackendResult<Option<String>>;
}

#[async_trait]
impl ProfileSource for BackendClient {
    async fn fetch_profile_role(&self, user_id: &str) -> BackendResult<Option<String>> {
        let query = Select::from("profiles").columns(&["id", "role"]).eq("id", user_id);
        let profile: Option<Profile> = self.fetch_optional(query).await?;
        Ok(profile.and_then(|p| p.role))
    }
}

#[derive(Debug, Clone, Copy)]
struct MemoEntry {
    role: Option<Role>,
    resolved_at: Instant,
}

/// Resolves and memoizes user roles
pub struct RoleResolver {
    source: Arc<dyn ProfileSource>,
    ttl: Duration,
    memo: RwLock<HashMap<String, MemoEntry>>,
}

impl RoleResolver {
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self::with_ttl(source, DEFAULT_ROLE_TTL)
    }

    pub fn with_ttl(source: Arc<dyn ProfileSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a user's role, using the memo while it is fresh
    pub async fn resolve(&self, user_id: &str) -> BackendResult<Option<Role>> {
        if let Some(entry) = self.memo.read().await.get(user_id) {
            if entry.resolved_at.elapsed() < self.ttl {
                return Ok(entry.role);
            }
        }

        let stored = self.source.fetch_profile_role(user_id).await?;
        let role = stored.as_deref().and_then(Role::parse);

        if role.is_none() {
            if let Some(value) = stored.as_deref() {
                tracing::debug!(user_id = %user_id, role = %value, "Profile role not on allow-list");
            }
        }

        let mut memo = self.memo.write().await;
        let ttl = self.ttl;
        memo.retain(|_, entry| entry.resolved_at.elapsed() < ttl);
        memo.insert(
            user_id.to_string(),
            MemoEntry {
                role,
                resolved_at: Instant::now(),
            },
        );

        Ok(role)
    }

    /// Forget one user's memoized role
    pub async fn invalidate(&self, user_id: &str) {
        self.memo.write().await.remove(user_id);
    }

    pub async fn clear(&self) {
        self.memo.write().await.clear();
    }

    /// Number of memoized users
    pub async fn len(&self) -> usize {
        self.memo.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Profile source backed by a map, counting fetches
    struct FakeProfiles {
        roles: HashMap<String, String>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeProfiles {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                roles: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(&[])
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileSource for FakeProfiles {
        async fn fetch_profile_role(&self, user_id: &str) -> BackendResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BackendError::Unavailable);
            }
            Ok(self.roles.get(user_id).cloned())
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("organiser"), Some(Role::Organiser));
        assert_eq!(Role::parse("lead_organiser"), Some(Role::LeadOrganiser));
        assert_eq!(Role::parse("delegate"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[tokio::test]
    async fn test_allowed_roles_returned_exactly() {
        let source = Arc::new(FakeProfiles::new(&[
            ("a", "admin"),
            ("o", "organiser"),
            ("l", "lead_organiser"),
        ]));
        let resolver = RoleResolver::new(source);

        assert_eq!(resolver.resolve("a").await.unwrap(), Some(Role::Admin));
        assert_eq!(resolver.resolve("o").await.unwrap(), Some(Role::Organiser));
        assert_eq!(resolver.resolve("l").await.unwrap(), Some(Role::LeadOrganiser));
    }

    #[tokio::test]
    async fn test_unknown_or_missing_role_is_none() {
        let source = Arc::new(FakeProfiles::new(&[("d", "delegate")]));
        let resolver = RoleResolver::new(source);

        assert_eq!(resolver.resolve("d").await.unwrap(), None);
        assert_eq!(resolver.resolve("nobody").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memo_expires_after_ttl() {
        let source = Arc::new(FakeProfiles::new(&[("a", "admin")]));
        let resolver = RoleResolver::new(Arc::clone(&source) as Arc<dyn ProfileSource>);

        resolver.resolve("a").await.unwrap();
        resolver.resolve("a").await.unwrap();
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        resolver.resolve("a").await.unwrap();
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        resolver.resolve("a").await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_memo_is_per_user() {
        let source = Arc::new(FakeProfiles::new(&[("a", "admin"), ("o", "organiser")]));
        let resolver = RoleResolver::new(Arc::clone(&source) as Arc<dyn ProfileSource>);

        resolver.resolve("a").await.unwrap();
        resolver.resolve("o").await.unwrap();
        resolver.resolve("a").await.unwrap();
        assert_eq!(source.calls(), 2);

        resolver.invalidate("a").await;
        resolver.resolve("a").await.unwrap();
        assert_eq!(source.calls(), 3);

        resolver.clear().await;
        resolver.resolve("o").await.unwrap();
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_absent_profile_is_memoized() {
        let source = Arc::new(FakeProfiles::new(&[]));
        let resolver = RoleResolver::new(Arc::clone(&source) as Arc<dyn ProfileSource>);

        assert_eq!(resolver.resolve("ghost").await.unwrap(), None);
        assert_eq!(resolver.resolve("ghost").await.unwrap(), None);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_errors_propagate_and_are_not_memoized() {
        let source = Arc::new(FakeProfiles::failing());
        let resolver = RoleResolver::new(Arc::clone(&source) as Arc<dyn ProfileSource>);

        assert!(matches!(
            resolver.resolve("a").await,
            Err(BackendError::Unavailable)
        ));
        assert!(resolver.resolve("a").await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned() {
        let source = Arc::new(FakeProfiles::new(&[("a", "admin"), ("o", "organiser")]));
        let resolver = RoleResolver::new(source);

        resolver.resolve("a").await.unwrap();
        resolver.resolve("ghost").await.unwrap();
        assert_eq!(resolver.len().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        resolver.resolve("o").await.unwrap();
        assert_eq!(resolver.len().await, 1);
    }
}
