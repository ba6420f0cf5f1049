//! Implements InputPort. Inquire-based interactive shell.
//!
//! Stands in for the browser: keeps a current location, follows the dispatcher's
//! redirects and applies the outcome of gated actions.

use crate::domain::{DomainError, LOGIN_PATH};
use crate::ports::InputPort;
use crate::usecases::{ActionOutcome, ActionService, AuthService, SessionStore, ViewDispatcher};
use async_trait::async_trait;
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::sync::{Arc, Mutex};
use tracing::warn;

const GO_TO: &str = "Go to page";
const LOG_IN: &str = "Log in";
const LOG_OUT: &str = "Log out";
const ADOPT: &str = "Adopt a pet";
const APPOINTMENT: &str = "Request vet appointment";
const WHO_AM_I: &str = "Show session";
const QUIT: &str = "Quit";

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    session: Arc<SessionStore>,
    dispatcher: Arc<ViewDispatcher>,
    auth: Arc<AuthService>,
    actions: Arc<ActionService>,
    location: Mutex<String>,
    /// Set when a gated action sent the user to login.
    return_to: Mutex<Option<String>>,
}

impl TuiInputPort {
    pub fn new(
        session: Arc<SessionStore>,
        dispatcher: Arc<ViewDispatcher>,
        auth: Arc<AuthService>,
        actions: Arc<ActionService>,
    ) -> Self {
        Self {
            session,
            dispatcher,
            auth,
            actions,
            location: Mutex::new("/".to_string()),
            return_to: Mutex::new(None),
        }
    }

    fn location(&self) -> String {
        self.location
            .lock()
            .map(|l| l.clone())
            .unwrap_or_else(|_| "/".to_string())
    }

    fn go(&self, path: &str) -> Result<(), DomainError> {
        let nav = self.dispatcher.navigate(path)?;
        for hop in &nav.redirects {
            println!("  -> redirected to {}", hop);
        }
        if nav.params.is_empty() {
            println!("[{}] {:?}", nav.path, nav.view);
        } else {
            println!("[{}] {:?} {:?}", nav.path, nav.view, nav.params);
        }
        if let Ok(mut l) = self.location.lock() {
            *l = nav.path;
        }
        Ok(())
    }

    fn apply(&self, outcome: ActionOutcome) -> Result<(), DomainError> {
        match outcome {
            ActionOutcome::Navigate(path) => self.go(&path),
            ActionOutcome::RedirectToLogin { message, return_to } => {
                println!("{}", message);
                if let Ok(mut r) = self.return_to.lock() {
                    *r = Some(return_to);
                }
                self.go(LOGIN_PATH)
            }
            ActionOutcome::Blocked {
                message,
                navigate_to,
                ..
            } => {
                println!("{}", message);
                match navigate_to {
                    Some(path) => self.go(&path),
                    None => Ok(()),
                }
            }
            ActionOutcome::Discarded => Ok(()),
        }
    }

    async fn log_in(&self) -> Result<(), DomainError> {
        let email = Text::new("Email:").prompt().map_err(ui_error)?;
        let password = Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .map_err(ui_error)?;
        self.submit_login(&email, &password).await
    }

    /// Authenticate and move to the destination. A failed attempt is reported and
    /// keeps the pending return path for the next try.
    async fn submit_login(&self, email: &str, password: &str) -> Result<(), DomainError> {
        let return_to = self.pending_return();

        match self.auth.login(email, password, return_to.as_deref()).await {
            Ok(outcome) => {
                self.clear_return();
                println!("Welcome, {} ({})", outcome.display_name, outcome.role);
                self.go(&outcome.destination)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                println!("Login failed: {}", e);
                Ok(())
            }
        }
    }

    fn pending_return(&self) -> Option<String> {
        self.return_to.lock().ok().and_then(|r| r.clone())
    }

    fn clear_return(&self) {
        if let Ok(mut r) = self.return_to.lock() {
            *r = None;
        }
    }

    fn show_session(&self) {
        match self.session.current() {
            Some(s) => println!(
                "{} (user {}, role {})",
                if s.display_name.is_empty() { "-" } else { s.display_name.as_str() },
                s.user_id,
                s.role
            ),
            None => println!("Not logged in"),
        }
    }

    fn menu(&self) -> Vec<&'static str> {
        let mut items = vec![GO_TO];
        if self.session.is_authenticated() {
            items.push(LOG_OUT);
        } else {
            items.push(LOG_IN);
        }
        items.extend([ADOPT, APPOINTMENT, WHO_AM_I, QUIT]);
        items
    }
}

fn ui_error(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

fn is_exit(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        self.go("/")?;
        loop {
            let prompt = format!("{} >", self.location());
            let choice = match Select::new(&prompt, self.menu()).prompt() {
                Ok(c) => c,
                Err(e) if is_exit(&e) => return Ok(()),
                Err(e) => return Err(ui_error(e)),
            };

            let step = match choice {
                GO_TO => match Text::new("Path:").with_default("/dashboard").prompt() {
                    Ok(path) => self.go(path.trim()),
                    Err(e) if is_exit(&e) => Ok(()),
                    Err(e) => Err(ui_error(e)),
                },
                LOG_IN => self.log_in().await,
                LOG_OUT => {
                    let next = self.auth.logout().await;
                    self.go(&next)
                }
                ADOPT => match Text::new("Pet id:").prompt() {
                    Ok(pet_id) => self
                        .actions
                        .adopt_pet(&pet_id)
                        .and_then(|outcome| self.apply(outcome)),
                    Err(e) if is_exit(&e) => Ok(()),
                    Err(e) => Err(ui_error(e)),
                },
                APPOINTMENT => {
                    println!("Checking eligibility...");
                    let outcome = self.actions.request_vet_appointment().await;
                    self.apply(outcome)
                }
                WHO_AM_I => {
                    self.show_session();
                    Ok(())
                }
                _ => return Ok(()),
            };

            if let Err(e) = step {
                match e {
                    DomainError::Ui(_) => return Err(e),
                    other => println!("Error: {}", other),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::MockBackend;
    use crate::adapters::persistence::MemoryStorage;
    use crate::usecases::{DashboardRedirector, EligibilityGate, RouteGuard};

    fn shell() -> TuiInputPort {
        let backend = Arc::new(MockBackend::demo());
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let gate = Arc::new(EligibilityGate::new(
            Arc::clone(&backend) as Arc<dyn crate::ports::AdoptionRequestsPort>,
            Arc::clone(&session),
        ));
        let dispatcher = Arc::new(ViewDispatcher::new(
            RouteGuard::new(Arc::clone(&session)),
            DashboardRedirector::new(Arc::clone(&session)),
            Arc::clone(&gate),
        ));
        let auth = Arc::new(AuthService::new(backend, Arc::clone(&session)));
        let actions = Arc::new(ActionService::new(Arc::clone(&session), gate));
        TuiInputPort::new(session, dispatcher, auth, actions)
    }

    #[tokio::test]
    async fn test_failed_login_keeps_return_path() {
        let tui = shell();
        let outcome = tui.actions.adopt_pet("12").unwrap();
        tui.apply(outcome).unwrap();
        assert_eq!(tui.location(), LOGIN_PATH);
        assert_eq!(tui.pending_return().as_deref(), Some("/adopt/12"));

        tui.submit_login("ann@example.com", "wrong").await.unwrap();
        assert!(!tui.session.is_authenticated());
        assert_eq!(tui.pending_return().as_deref(), Some("/adopt/12"));

        tui.submit_login("ann@example.com", "ann").await.unwrap();
        assert!(tui.session.is_authenticated());
        assert_eq!(tui.pending_return(), None);
        assert_eq!(tui.location(), "/adopt/12");
    }
}
