//! Route guard. Decides whether the current session may open a view.
//!
//! Two strategies with deliberately different failure behavior:
//! - `StrictRoleGuard`: any failure (no session, wrong role) bounces to `/login`
//! - `SelfCorrectingGuard`: dashboard layout; a valid role on a foreign path is
//!   sent to its own dashboard instead of to login

use crate::domain::{GuardDecision, Role, RouteRequest, Session};
use crate::usecases::session_store::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// One way of turning (session, path) into a decision.
pub trait GuardStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self, session: Option<&Session>, current_path: &str) -> GuardDecision;
}

/// Login required, optionally with one exact role. Wrong role is treated like
/// no login at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrictRoleGuard {
    pub required_role: Option<Role>,
}

impl StrictRoleGuard {
    pub fn new(required_role: Option<Role>) -> Self {
        Self { required_role }
    }
}

impl GuardStrategy for StrictRoleGuard {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn evaluate(&self, session: Option<&Session>, _current_path: &str) -> GuardDecision {
        let Some(session) = session else {
            return GuardDecision::to_login();
        };
        match self.required_role {
            Some(required) if session.role != required => GuardDecision::to_login(),
            _ => GuardDecision::Allow,
        }
    }
}

/// Role allow-list plus "path must live under `/dashboard/{role}`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCorrectingGuard {
    pub allowed_roles: Vec<Role>,
}

impl SelfCorrectingGuard {
    pub fn new(allowed_roles: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed_roles: allowed_roles.into(),
        }
    }

    /// Allow-list used by the shared dashboard layout.
    pub fn dashboard_layout() -> Self {
        Self::new([Role::User, Role::Shelter])
    }
}

impl GuardStrategy for SelfCorrectingGuard {
    fn name(&self) -> &'static str {
        "self-correcting"
    }

    fn evaluate(&self, session: Option<&Session>, current_path: &str) -> GuardDecision {
        let Some(role) = session.map(|s| s.role) else {
            return GuardDecision::to_login();
        };
        if !self.allowed_roles.contains(&role) {
            return GuardDecision::to_login();
        }
        // Plain prefix match, so `/dashboard/user` also covers `/dashboard/user/pets`.
        let own = role.dashboard_path();
        if current_path.starts_with(&own) {
            GuardDecision::Allow
        } else {
            GuardDecision::RedirectTo(own)
        }
    }
}

/// Guard facade bound to the live session.
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Strict guard: `Allow` iff logged in and (no role required or role matches).
    pub fn decide(&self, required_role: Option<Role>) -> GuardDecision {
        self.check(&StrictRoleGuard::new(required_role), "")
    }

    /// Strict guard for a full navigation request.
    pub fn decide_request(&self, request: &RouteRequest) -> GuardDecision {
        self.check(&StrictRoleGuard::new(request.required_role), &request.path)
    }

    /// Dashboard-layout guard for `current_path`.
    pub fn decide_with_self_correct(
        &self,
        allowed_roles: &[Role],
        current_path: &str,
    ) -> GuardDecision {
        self.check(&SelfCorrectingGuard::new(allowed_roles), current_path)
    }

    /// Evaluate any strategy against the current session.
    pub fn check(&self, strategy: &dyn GuardStrategy, current_path: &str) -> GuardDecision {
        let session = self.session.current();
        let decision = strategy.evaluate(session.as_ref(), current_path);
        if let GuardDecision::RedirectTo(to) = &decision {
            debug!(
                strategy = strategy.name(),
                path = current_path,
                role = ?session.as_ref().map(|s| s.role),
                redirect = %to,
                "guard redirect"
            );
        }
        decision
    }
}
