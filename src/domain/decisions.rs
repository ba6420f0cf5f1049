//! Per-request decision values. Built, consumed immediately, never persisted.

use super::entities::{Role, UserId};
use std::fmt;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// One navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    pub required_role: Option<Role>,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>, required_role: Option<Role>) -> Self {
        Self {
            path: path.into(),
            required_role,
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(String),
}

impl GuardDecision {
    pub fn to_login() -> Self {
        GuardDecision::RedirectTo(LOGIN_PATH.to_string())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityPredicate {
    HasApprovedAdoption,
    IsAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityQuery {
    pub subject_user_id: UserId,
    pub predicate: EligibilityPredicate,
}

impl EligibilityQuery {
    pub fn new(subject_user_id: UserId, predicate: EligibilityPredicate) -> Self {
        Self {
            subject_user_id,
            predicate,
        }
    }
}

/// Why a gated action was refused. `NoApprovedAdoption` and `CheckFailed`
/// must stay distinguishable: the first is a business rule, the second an I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotAuthenticated,
    NoApprovedAdoption,
    CheckFailed,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::NotAuthenticated => "not authenticated",
            DenialReason::NoApprovedAdoption => "no approved adoption",
            DenialReason::CheckFailed => "eligibility check failed",
        }
    }

    /// Text shown to the user when the gated action is blocked.
    pub fn user_message(self) -> &'static str {
        match self {
            DenialReason::NotAuthenticated => "Please log in to continue.",
            DenialReason::NoApprovedAdoption => {
                "You need to adopt a pet first before requesting veterinary appointments. \
                 Please browse available pets and complete an adoption."
            }
            DenialReason::CheckFailed => "Error checking your eligibility, please try again",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityResult {
    Allowed,
    Denied(DenialReason),
}

impl EligibilityResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EligibilityResult::Allowed)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            EligibilityResult::Allowed => None,
            EligibilityResult::Denied(r) => Some(r.as_str()),
        }
    }
}
