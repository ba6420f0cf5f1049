//! Application use cases. Orchestrate domain logic via ports.

pub mod action_service;
pub mod auth_service;
pub mod dashboard_redirector;
pub mod eligibility_gate;
pub mod route_guard;
pub mod session_store;
pub mod view_dispatcher;

pub use action_service::{ActionOutcome, ActionService};
pub use auth_service::{AuthService, LoginOutcome};
pub use dashboard_redirector::DashboardRedirector;
pub use eligibility_gate::{CheckTicket, Checked, EligibilityGate};
pub use route_guard::{GuardStrategy, RouteGuard, SelfCorrectingGuard, StrictRoleGuard};
pub use session_store::SessionStore;
pub use view_dispatcher::{Access, Dispatch, Navigation, View, ViewDispatcher};
