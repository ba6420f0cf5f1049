//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AdoptionRequest, DomainError, LoginGrant, UserId, UserProfile};

/// Client-local key/value storage (one string per slot).
///
/// Must survive a restart of the client; never shared between profiles.
#[async_trait::async_trait]
pub trait StoragePort: Send + Sync {
    /// Read all slots. Absent keys are simply missing from the map.
    async fn load(&self) -> Result<std::collections::HashMap<String, String>, DomainError>;

    /// Replace every slot with `entries` in one write.
    async fn replace_all(&self, entries: &[(&str, &str)]) -> Result<(), DomainError>;

    /// Remove every slot.
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Read side of the backend's adoption-request collection.
#[async_trait::async_trait]
pub trait AdoptionRequestsPort: Send + Sync {
    /// `GET /adoption-requests/user/{user_id}`.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AdoptionRequest>, DomainError>;
}

/// Backend authentication endpoints used by the login flow.
#[async_trait::async_trait]
pub trait AuthApiPort: Send + Sync {
    /// `POST /auth/login`. Sent without a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, DomainError>;

    /// `GET /users/{user_id}`, authorized with `token`.
    async fn fetch_profile(&self, user_id: UserId, token: &str)
        -> Result<UserProfile, DomainError>;
}
