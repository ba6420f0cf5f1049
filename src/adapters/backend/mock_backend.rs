//! Mock backend for tests and offline runs.
//!
//! In-memory adoption requests and accounts; failures can be injected to
//! exercise the fail-closed paths without a server.

use crate::domain::{AdoptionRequest, DomainError, LoginGrant, UserId, UserProfile};
use crate::ports::{AdoptionRequestsPort, AuthApiPort};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Failure to inject into adoption reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Connection refused, timeout, ...
    Network,
    /// Non-success HTTP status.
    Status(u16),
}

impl MockFailure {
    fn to_error(self) -> DomainError {
        match self {
            MockFailure::Network => DomainError::Backend("[MOCK] connection refused".into()),
            MockFailure::Status(401) => DomainError::Unauthorized("[MOCK] HTTP 401".into()),
            MockFailure::Status(403) => DomainError::Forbidden("[MOCK] HTTP 403".into()),
            MockFailure::Status(code) => DomainError::Backend(format!("[MOCK] HTTP {}", code)),
        }
    }
}

#[derive(Debug, Clone)]
struct MockAccount {
    password: String,
    grant: LoginGrant,
    profile: Option<UserProfile>,
}

/// In-memory stand-in for the REST backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    adoptions: Mutex<HashMap<UserId, Vec<AdoptionRequest>>>,
    accounts: Mutex<HashMap<String, MockAccount>>,
    read_failure: Mutex<Option<MockFailure>>,
    adoption_reads: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::default()
        }
    }

    /// Small demo data set for `offline` runs.
    pub fn demo() -> Self {
        let backend = Self::new();
        backend.add_account(
            "admin@example.com",
            "admin",
            grant("token-admin", "ADMIN", 1),
            Some(profile(Some("Site Admin"), None, None)),
        );
        backend.add_account(
            "ann@example.com",
            "ann",
            grant("token-ann", "user", 2),
            Some(profile(None, Some("ann"), None)),
        );
        backend.add_account(
            "ben@example.com",
            "ben",
            grant("token-ben", "User", 3),
            None,
        );
        backend.add_account(
            "paws@example.com",
            "paws",
            grant("token-paws", "shelter", 4),
            Some(profile(Some("Happy Paws Shelter"), None, None)),
        );
        backend.add_account(
            "vet@example.com",
            "vet",
            grant("token-vet", "vet", 5),
            Some(profile(None, None, Some("vet@example.com"))),
        );
        backend.set_adoptions(
            UserId(2),
            vec![
                AdoptionRequest::with_status("Pending"),
                AdoptionRequest::with_status("APPROVED"),
            ],
        );
        backend.set_adoptions(UserId(3), vec![AdoptionRequest::with_status("rejected")]);
        backend
    }

    pub fn set_adoptions(&self, user_id: UserId, requests: Vec<AdoptionRequest>) {
        if let Ok(mut map) = self.adoptions.lock() {
            map.insert(user_id, requests);
        }
    }

    pub fn add_account(
        &self,
        email: &str,
        password: &str,
        grant: LoginGrant,
        profile: Option<UserProfile>,
    ) {
        if let Ok(mut map) = self.accounts.lock() {
            map.insert(
                email.to_string(),
                MockAccount {
                    password: password.to_string(),
                    grant,
                    profile,
                },
            );
        }
    }

    /// Make every subsequent adoption read fail.
    pub fn fail_reads(&self, failure: MockFailure) {
        if let Ok(mut f) = self.read_failure.lock() {
            *f = Some(failure);
        }
    }

    pub fn adoption_reads(&self) -> usize {
        self.adoption_reads.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

/// Login response as the backend would send it.
pub fn grant(token: &str, role: &str, user_id: i64) -> LoginGrant {
    LoginGrant {
        token: Some(token.to_string()),
        role: Some(role.to_string()),
        user_id: Some(UserId(user_id)),
    }
}

pub fn profile(
    full_name: Option<&str>,
    username: Option<&str>,
    email: Option<&str>,
) -> UserProfile {
    UserProfile {
        full_name: full_name.map(String::from),
        username: username.map(String::from),
        email: email.map(String::from),
    }
}

#[async_trait::async_trait]
impl AdoptionRequestsPort for MockBackend {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AdoptionRequest>, DomainError> {
        self.adoption_reads.fetch_add(1, Ordering::SeqCst);
        info!(user_id = %user_id, "[MOCK] listing adoption requests");
        self.simulate_latency().await;

        let failure = self.read_failure.lock().ok().and_then(|f| *f);
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }
        Ok(self
            .adoptions
            .lock()
            .ok()
            .and_then(|map| map.get(&user_id).cloned())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl AuthApiPort for MockBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, DomainError> {
        info!(email, "[MOCK] login");
        self.simulate_latency().await;

        let account = self
            .accounts
            .lock()
            .ok()
            .and_then(|map| map.get(email).cloned());
        match account {
            Some(a) if a.password == password => Ok(a.grant),
            _ => Err(DomainError::Unauthorized("[MOCK] bad credentials".into())),
        }
    }

    async fn fetch_profile(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<UserProfile, DomainError> {
        self.simulate_latency().await;

        let accounts = self
            .accounts
            .lock()
            .map_err(|_| DomainError::Backend("[MOCK] lock poisoned".into()))?;
        let account = accounts
            .values()
            .find(|a| a.grant.user_id == Some(user_id))
            .ok_or_else(|| DomainError::Backend(format!("[MOCK] HTTP 404 for user {}", user_id)))?;
        if account.grant.token.as_deref() != Some(token) {
            return Err(DomainError::Unauthorized("[MOCK] token mismatch".into()));
        }
        account
            .profile
            .clone()
            .ok_or_else(|| DomainError::Backend(format!("[MOCK] HTTP 500 for user {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_has_no_requests() {
        let backend = MockBackend::new();
        assert!(backend.list_for_user(UserId(99)).await.unwrap().is_empty());
        assert_eq!(backend.adoption_reads(), 1);
    }

    #[tokio::test]
    async fn test_demo_login_and_profile() {
        let backend = MockBackend::demo();
        let g = backend.login("paws@example.com", "paws").await.unwrap();
        assert_eq!(g.user_id, Some(UserId(4)));

        let p = backend
            .fetch_profile(UserId(4), g.token.as_deref().unwrap())
            .await
            .unwrap();
        assert_eq!(p.display_name(), Some("Happy Paws Shelter"));

        assert!(matches!(
            backend.login("paws@example.com", "wrong").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_status_maps_to_domain_error() {
        let backend = MockBackend::new();
        backend.fail_reads(MockFailure::Status(403));
        assert!(matches!(
            backend.list_for_user(UserId(1)).await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
