//! Dashboard Redirect
//!
//! Decides where the dashboard sends a visitor:
//!
//! - no session: sign-in route
//! - session, role not resolved or off the allow-list: stay
//! - `admin`: admin area
//! - `organiser` / `lead_organiser`: patch area
//!
//! The check runs inside a [`ViewScope`]. When the scope is cancelled before
//! the session or role lookup settles, the controller neither changes state
//! nor redirects.

use std::sync::{Arc, Mutex};

use crate::backend::SessionSource;
use crate::roles::{Role, RoleResolver};
use crate::scope::ViewScope;

/// Routes the dashboard can redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Admin,
    Patch,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/auth",
            Route::Admin => "/admin",
            Route::Patch => "/patch",
        }
    }
}

/// Where the dashboard check currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Unauthenticated,
    /// Signed in; `None` means the role is unknown
    Authenticated(Option<Role>),
    Error(String),
}

/// Redirect target for a state, if any
pub fn redirect_for(state: &DashboardState) -> Option<Route> {
    match state {
        DashboardState::Unauthenticated => Some(Route::SignIn),
        DashboardState::Authenticated(Some(Role::Admin)) => Some(Route::Admin),
        DashboardState::Authenticated(Some(Role::Organiser | Role::LeadOrganiser)) => {
            Some(Route::Patch)
        }
        DashboardState::Authenticated(None)
        | DashboardState::Loading
        | DashboardState::Error(_) => None,
    }
}

/// Performs redirects
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Navigator that records every redirect it is asked to perform
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

/// Runs the session and role checks for one dashboard view
pub struct DashboardController {
    sessions: Arc<dyn SessionSource>,
    roles: Arc<RoleResolver>,
    navigator: Arc<dyn Navigator>,
    state: DashboardState,
}

impl DashboardController {
    pub fn new(
        sessions: Arc<dyn SessionSource>,
        roles: Arc<RoleResolver>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            sessions,
            roles,
            navigator,
            state: DashboardState::Loading,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Check the session, then the role, redirecting as required.
    ///
    /// Returns the redirect issued, if any.
    pub async fn check(&mut self, scope: &ViewScope) -> Option<Route> {
        let Some(session) = scope.run(self.sessions.current_session()).await else {
            tracing::debug!("Dashboard check superseded during session lookup");
            return None;
        };

        let session = match session {
            Ok(Some(session)) => session,
            Ok(None) => return self.settle(scope, DashboardState::Unauthenticated),
            Err(e) => return self.settle(scope, DashboardState::Error(e.to_string())),
        };

        let Some(role) = scope.run(self.roles.resolve(&session.user_id)).await else {
            tracing::debug!("Dashboard check superseded during role lookup");
            return None;
        };

        let next = match role {
            Ok(role) => DashboardState::Authenticated(role),
            Err(e) => {
                tracing::warn!(user_id = %session.user_id, error = %e, "Role lookup failed");
                DashboardState::Error(e.to_string())
            }
        };
        self.settle(scope, next)
    }

    fn settle(&mut self, scope: &ViewScope, next: DashboardState) -> Option<Route> {
        if scope.is_cancelled() {
            return None;
        }

        self.state = next;
        let route = redirect_for(&self.state);
        if let Some(route) = route {
            tracing::info!(route = route.path(), "Dashboard redirect");
            self.navigator.redirect(route);
        }
        route
    }
}
