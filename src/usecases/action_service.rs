//! Gated user actions: adopting a pet, requesting a vet appointment.
//!
//! Each action returns what the view layer should do next; nothing here
//! renders or navigates by itself.

use crate::domain::{DenialReason, DomainError, EligibilityResult, LOGIN_PATH};
use crate::usecases::eligibility_gate::{Checked, EligibilityGate};
use crate::usecases::session_store::SessionStore;
use std::sync::Arc;
use tracing::{debug, info};

pub const APPOINTMENT_REQUEST_PATH: &str = "/dashboard/user/appointment-request";
pub const BROWSE_PETS_PATH: &str = "/all-pets";
const ADOPT_LOGIN_MESSAGE: &str = "Please log in to adopt a pet.";

/// Next step for the view layer after a gated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Navigate(String),
    /// Send to login; after login continue at `return_to`.
    RedirectToLogin { message: String, return_to: String },
    /// Show `message`; then go to `navigate_to` if set, else stay.
    Blocked {
        reason: DenialReason,
        message: String,
        navigate_to: Option<String>,
    },
    /// The user navigated away before the check finished; apply nothing.
    Discarded,
}

impl ActionOutcome {
    /// Path the client ends up on, if the outcome moves it.
    pub fn destination(&self) -> Option<&str> {
        match self {
            ActionOutcome::Navigate(p) => Some(p),
            ActionOutcome::RedirectToLogin { .. } => Some(LOGIN_PATH),
            ActionOutcome::Blocked { navigate_to, .. } => navigate_to.as_deref(),
            ActionOutcome::Discarded => None,
        }
    }
}

pub struct ActionService {
    session: Arc<SessionStore>,
    eligibility: Arc<EligibilityGate>,
}

impl ActionService {
    pub fn new(session: Arc<SessionStore>, eligibility: Arc<EligibilityGate>) -> Self {
        Self {
            session,
            eligibility,
        }
    }

    /// "Adopt" button on a pet card or detail page.
    ///
    /// # Errors
    /// `DomainError::InvalidInput` if `pet_id` is blank or is not a single path segment.
    pub fn adopt_pet(&self, pet_id: &str) -> Result<ActionOutcome, DomainError> {
        let pet_id = pet_id.trim();
        if pet_id.is_empty() || pet_id.contains(['/', '?', '#']) {
            return Err(DomainError::InvalidInput(format!("bad pet id '{}'", pet_id)));
        }
        let form = format!("/adopt/{}", pet_id);
        Ok(match self.session.get_user_id() {
            Some(_) => ActionOutcome::Navigate(form),
            None => {
                debug!(pet_id, "adopt requires login");
                ActionOutcome::RedirectToLogin {
                    message: ADOPT_LOGIN_MESSAGE.to_string(),
                    return_to: form,
                }
            }
        })
    }

    /// "Vet Appointments" card: needs at least one approved adoption.
    /// The check is ticketed; a navigation while it runs discards the result.
    pub async fn request_vet_appointment(&self) -> ActionOutcome {
        let Some(user_id) = self.session.get_user_id() else {
            return ActionOutcome::RedirectToLogin {
                message: DenialReason::NotAuthenticated.user_message().to_string(),
                return_to: APPOINTMENT_REQUEST_PATH.to_string(),
            };
        };

        let ticket = self.eligibility.begin_check();
        let result = match self
            .eligibility
            .check_has_approved_adoption_for(ticket, user_id)
            .await
        {
            Checked::Current(result) => result,
            Checked::Superseded => return ActionOutcome::Discarded,
        };

        let outcome = match result {
            EligibilityResult::Allowed => {
                ActionOutcome::Navigate(APPOINTMENT_REQUEST_PATH.to_string())
            }
            EligibilityResult::Denied(reason @ DenialReason::NoApprovedAdoption) => {
                ActionOutcome::Blocked {
                    reason,
                    message: reason.user_message().to_string(),
                    navigate_to: Some(BROWSE_PETS_PATH.to_string()),
                }
            }
            EligibilityResult::Denied(reason) => ActionOutcome::Blocked {
                reason,
                message: reason.user_message().to_string(),
                navigate_to: None,
            },
        };
        info!(user_id = %user_id, outcome = ?outcome, "vet appointment request");
        outcome
    }
}
