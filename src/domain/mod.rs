//! Core domain layer. No external I/O dependencies.
//!
//! Entities and decision values live here. Dependencies flow inward.

pub mod decisions;
pub mod entities;
pub mod errors;

pub use decisions::{
    DenialReason, EligibilityPredicate, EligibilityQuery, EligibilityResult, GuardDecision,
    RouteRequest, HOME_PATH, LOGIN_PATH,
};
pub use entities::{
    AdoptionRequest, AdoptionStatus, LoginGrant, Role, Session, UnknownRole, UserId, UserProfile,
};
pub use errors::DomainError;
