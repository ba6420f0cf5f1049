//! Domain entities. Pure data structures for the client-side auth core.
//!
//! No HTTP/storage types here; adapters map their payloads into these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who is using the client. Closed set; anything else is treated as "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Shelter,
    Vet,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Shelter, Role::Vet];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Shelter => "shelter",
            Role::Vet => "vet",
        }
    }

    /// Landing page for this role, e.g. `/dashboard/shelter`.
    pub fn dashboard_path(self) -> String {
        format!("/dashboard/{}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`Role`]. Carries the rejected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive; the backend sends e.g. `SHELTER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "shelter" => Ok(Role::Shelter),
            "vet" => Ok(Role::Vet),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Backend user identifier (numeric on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(UserId)
    }
}

/// The client-held proof of authentication plus cached identity.
///
/// A `Session` value always has all of token, user id and role; a partially
/// stored session is never materialized (see `SessionStore::load`).
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub display_name: String,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        user_id: UserId,
        role: Role,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id,
            role,
            display_name: display_name.into(),
        }
    }
}

// Token stays out of logs and panics.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Adoption request status, case-normalized once when read from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdoptionStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl AdoptionStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, AdoptionStatus::Approved)
    }
}

impl From<String> for AdoptionStatus {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "pending" => AdoptionStatus::Pending,
            "approved" => AdoptionStatus::Approved,
            "rejected" => AdoptionStatus::Rejected,
            _ => AdoptionStatus::Other(normalized),
        }
    }
}

impl From<&str> for AdoptionStatus {
    fn from(raw: &str) -> Self {
        AdoptionStatus::from(raw.to_string())
    }
}

impl From<AdoptionStatus> for String {
    fn from(status: AdoptionStatus) -> Self {
        match status {
            AdoptionStatus::Pending => "pending".to_string(),
            AdoptionStatus::Approved => "approved".to_string(),
            AdoptionStatus::Rejected => "rejected".to_string(),
            AdoptionStatus::Other(s) => s,
        }
    }
}

/// One record of `GET /adoption-requests/user/{userId}`. Only `status` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub pet_id: Option<i64>,
    pub status: AdoptionStatus,
}

impl AdoptionRequest {
    pub fn with_status(status: impl Into<AdoptionStatus>) -> Self {
        Self {
            id: None,
            pet_id: None,
            status: status.into(),
        }
    }
}

/// Credentials returned by `POST /auth/login`. Fields are optional on the wire;
/// `AuthService` rejects a response without token or role.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Subset of `GET /users/{id}` used to pick a display name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    /// `fullName`, then `username`, then `email`; blanks are skipped.
    pub fn display_name(&self) -> Option<&str> {
        [&self.full_name, &self.username, &self.email]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}
