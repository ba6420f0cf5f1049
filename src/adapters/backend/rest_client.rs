//! REST adapter for the pet-adoption backend.
//!
//! Implements `AdoptionRequestsPort` and `AuthApiPort` over reqwest.
//! Attaches `Authorization: Bearer <token>` from the session to every call except
//! the login/register endpoints. No retries: failures are reported once.

use crate::domain::{AdoptionRequest, DomainError, LoginGrant, UserId, UserProfile};
use crate::ports::{AdoptionRequestsPort, AuthApiPort};
use crate::usecases::session_store::SessionStore;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP client for the backend REST API.
pub struct RestBackend {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl RestBackend {
    /// # Arguments
    /// * `base_url` - API root, e.g. "http://localhost:8080/api"
    /// * `timeout` - per-request timeout; an elapsed timeout is a failed read
    /// * `session` - source of the bearer token
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Add the session's bearer token unless `path` is an auth endpoint.
    fn authorized(&self, req: RequestBuilder, path: &str) -> RequestBuilder {
        if !needs_bearer(path) {
            debug!(path, "skipping token for auth endpoint");
            return req;
        }
        match self.session.get_token() {
            Some(token) => req.bearer_auth(token),
            None => {
                debug!(path, "no session token for request");
                req
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<T, DomainError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(path, status = %status, "backend returned error");
            return Err(status_error(status, &text));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::Backend(format!("parse {} response: {}", path, e)))
    }
}

/// Login and registration go out without credentials.
fn needs_bearer(path: &str) -> bool {
    !path.ends_with("/login") && !path.ends_with("/register")
}

/// Map a non-success status into the domain taxonomy.
fn status_error(status: StatusCode, body: &str) -> DomainError {
    let detail = format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    );
    match status {
        StatusCode::UNAUTHORIZED => DomainError::Unauthorized(detail),
        StatusCode::FORBIDDEN => DomainError::Forbidden(detail),
        _ => DomainError::Backend(detail),
    }
}

#[async_trait::async_trait]
impl AdoptionRequestsPort for RestBackend {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AdoptionRequest>, DomainError> {
        let path = format!("/adoption-requests/user/{}", user_id);
        let req = self.authorized(self.client.get(self.url(&path)), &path);
        let response = req
            .send()
            .await
            .map_err(|e| DomainError::Backend(format!("HTTP request failed: {}", e)))?;
        let requests: Vec<AdoptionRequest> = Self::read_json(&path, response).await?;
        debug!(user_id = %user_id, count = requests.len(), "adoption requests fetched");
        Ok(requests)
    }
}

#[async_trait::async_trait]
impl AuthApiPort for RestBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, DomainError> {
        let path = "/auth/login";
        let req = self
            .authorized(self.client.post(self.url(path)), path)
            .json(&LoginBody { email, password });
        let response = req
            .send()
            .await
            .map_err(|e| DomainError::Backend(format!("HTTP request failed: {}", e)))?;
        Self::read_json(path, response).await
    }

    async fn fetch_profile(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<UserProfile, DomainError> {
        let path = format!("/users/{}", user_id);
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DomainError::Backend(format!("HTTP request failed: {}", e)))?;
        Self::read_json(&path, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryStorage;

    #[test]
    fn test_needs_bearer() {
        assert!(!needs_bearer("/auth/login"));
        assert!(!needs_bearer("/auth/register"));
        assert!(needs_bearer("/adoption-requests/user/7"));
        assert!(needs_bearer("/users/7"));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            DomainError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "nope"),
            DomainError::Forbidden(_)
        ));
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, &"x".repeat(500)) {
            DomainError::Backend(msg) => assert!(msg.len() < 300),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let backend =
            RestBackend::new("http://api.test/api/", Duration::from_secs(1), session).unwrap();
        assert_eq!(
            backend.url("/adoption-requests/user/7"),
            "http://api.test/api/adoption-requests/user/7"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_error() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        // Port 9 (discard) on loopback: refused or timed out, never a success.
        let backend =
            RestBackend::new("http://127.0.0.1:9/api", Duration::from_millis(300), session)
                .unwrap();
        assert!(backend.list_for_user(UserId(7)).await.is_err());
    }
}
