//! Login / logout flow. The only writers of the session store.

use crate::domain::{DomainError, HOME_PATH, Role, UserId};
use crate::ports::AuthApiPort;
use crate::usecases::session_store::SessionStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Where to go after a successful login, plus what was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub destination: String,
    pub user_id: UserId,
    pub role: Role,
    pub display_name: String,
}

pub struct AuthService {
    api: Arc<dyn AuthApiPort>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApiPort>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Authenticate and store the session.
    ///
    /// The display name comes from the user's profile (full name, username, email);
    /// if the profile read fails the login email is used. `redirect_to` (set when a
    /// gated action sent the user to login) wins over the role dashboard.
    ///
    /// # Errors
    /// `DomainError::Auth` when the response lacks token, role or user id, or the
    /// role is unknown; backend errors are passed through.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<LoginOutcome, DomainError> {
        let grant = self.api.login(email.trim(), password).await?;

        let token = grant
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DomainError::Auth("invalid login response: missing token".into()))?;
        let role: Role = grant
            .role
            .ok_or_else(|| DomainError::Auth("invalid login response: missing role".into()))?
            .parse()
            .map_err(|e| DomainError::Auth(format!("invalid login response: {}", e)))?;
        let user_id = grant
            .user_id
            .ok_or_else(|| DomainError::Auth("invalid login response: missing user id".into()))?;

        let display_name = match self.api.fetch_profile(user_id, &token).await {
            Ok(profile) => profile
                .display_name()
                .map(String::from)
                .unwrap_or_else(|| email.trim().to_string()),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "profile read failed; using login email");
                email.trim().to_string()
            }
        };

        self.session
            .set_session(token, user_id, role, display_name.clone())
            .await;
        if !self.session.is_authenticated() {
            return Err(DomainError::Storage(
                "session could not be stored; login not kept".into(),
            ));
        }

        let destination = redirect_to
            .filter(|p| p.starts_with('/'))
            .map(String::from)
            .unwrap_or_else(|| role.dashboard_path());

        info!(user_id = %user_id, role = %role, destination = %destination, "login successful");
        Ok(LoginOutcome {
            destination,
            user_id,
            role,
            display_name,
        })
    }

    /// Clear the session. Returns the page to show next.
    pub async fn logout(&self) -> String {
        self.session.clear_session().await;
        HOME_PATH.to_string()
    }
}
