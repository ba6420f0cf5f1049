//! Eligibility gate. Cross-entity preconditions for user actions.
//!
//! - Reads the backend through AdoptionRequestsPort; never writes anything
//! - A failed read is a denial with its own reason, never an allow
//! - Each check can carry a ticket; a check whose ticket was superseded by a
//!   newer check or a navigation is reported as `Checked::Superseded`

use crate::domain::{
    DenialReason, EligibilityPredicate, EligibilityQuery, EligibilityResult, UserId,
};
use crate::ports::AdoptionRequestsPort;
use crate::usecases::session_store::SessionStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Generation stamp handed out by [`EligibilityGate::begin_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket(u64);

/// Result of a ticketed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked<T> {
    Current(T),
    /// A newer check or navigation happened while this one was in flight.
    Superseded,
}

pub struct EligibilityGate {
    adoptions: Arc<dyn AdoptionRequestsPort>,
    session: Arc<SessionStore>,
    generation: AtomicU64,
}

impl EligibilityGate {
    pub fn new(adoptions: Arc<dyn AdoptionRequestsPort>, session: Arc<SessionStore>) -> Self {
        Self {
            adoptions,
            session,
            generation: AtomicU64::new(0),
        }
    }

    /// `Allowed` iff the user has at least one adoption request with status "approved"
    /// (any case). Empty list and failed read are distinct denials.
    pub async fn check_has_approved_adoption(&self, user_id: UserId) -> EligibilityResult {
        let requests = match self.adoptions.list_for_user(user_id).await {
            Ok(r) => r,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "adoption eligibility read failed");
                return EligibilityResult::Denied(DenialReason::CheckFailed);
            }
        };

        let approved = requests.iter().filter(|r| r.status.is_approved()).count();
        debug!(
            user_id = %user_id,
            total = requests.len(),
            approved,
            "adoption requests checked"
        );

        if approved > 0 {
            EligibilityResult::Allowed
        } else {
            info!(user_id = %user_id, "no approved adoption");
            EligibilityResult::Denied(DenialReason::NoApprovedAdoption)
        }
    }

    /// Mirrors the session store.
    pub fn check_is_authenticated(&self) -> EligibilityResult {
        if self.session.is_authenticated() {
            EligibilityResult::Allowed
        } else {
            EligibilityResult::Denied(DenialReason::NotAuthenticated)
        }
    }

    /// Dispatch a query to the matching predicate.
    pub async fn evaluate(&self, query: EligibilityQuery) -> EligibilityResult {
        match query.predicate {
            EligibilityPredicate::IsAuthenticated => self.check_is_authenticated(),
            EligibilityPredicate::HasApprovedAdoption => {
                self.check_has_approved_adoption(query.subject_user_id).await
            }
        }
    }

    /// Start a ticketed check. Supersedes every earlier ticket.
    pub fn begin_check(&self) -> CheckTicket {
        CheckTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate all outstanding tickets (the user navigated away).
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: CheckTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Ticketed variant of [`EligibilityGate::check_has_approved_adoption`]. The
    /// result is dropped if the ticket went stale while the read was pending.
    pub async fn check_has_approved_adoption_for(
        &self,
        ticket: CheckTicket,
        user_id: UserId,
    ) -> Checked<EligibilityResult> {
        let result = self.check_has_approved_adoption(user_id).await;
        if self.is_current(ticket) {
            Checked::Current(result)
        } else {
            debug!(user_id = %user_id, "discarding superseded eligibility result");
            Checked::Superseded
        }
    }
}
