//! View dispatcher: maps a requested path to a guarded view.
//!
//! Route table first match wins. Every dispatch counts as a navigation and
//! supersedes eligibility checks still in flight for the previous view.

use crate::domain::{DomainError, GuardDecision, Role};
use crate::usecases::dashboard_redirector::DashboardRedirector;
use crate::usecases::eligibility_gate::EligibilityGate;
use crate::usecases::route_guard::{RouteGuard, SelfCorrectingGuard, StrictRoleGuard};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use Access::{Authenticated, DashboardLayout, Public};

/// Redirect hops followed by [`ViewDispatcher::navigate`] before giving up.
const MAX_REDIRECTS: usize = 5;

/// Presentational views. Rendering is done by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    ForgotPassword,
    AboutUs,
    Gallery,
    ContactUs,
    AllPets,
    AllPetsPage,
    PetDetail,
    AdminDashboard,
    ManageUsers,
    ManageShelters,
    ManageVets,
    ManagePets,
    CreateAnnouncement,
    ManageAnnouncements,
    AdminContactMessages,
    VetDashboard,
    VetHealthRecords,
    VetPatients,
    VetAppointmentRequests,
    VetEmergencyCases,
    VetCreateBlogPost,
    VetManageBlogPosts,
    SendHealthRecord,
    UserDashboard,
    UserAppointmentRequest,
    UserAppointmentRequests,
    UserHealthRecords,
    UserApplications,
    UserFavorites,
    ShelterDashboard,
    AddPet,
    ShelterPets,
    EditPet,
    AdoptionRequests,
    StrayPetReports,
    StrayPetReport,
    AdoptionApplication,
    MyAdoptedPets,
    AdoptionApplicationDetails,
    NotFound,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Strict guard, any role.
    Authenticated,
    /// Strict guard, exactly this role.
    Role(Role),
    /// Self-correcting guard of the shared user/shelter dashboard layout.
    DashboardLayout,
    /// `/dashboard` itself; resolved by the redirector.
    DashboardRedirect,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub access: Access,
    pub view: View,
}

const fn route(pattern: &'static str, access: Access, view: View) -> RouteDef {
    RouteDef {
        pattern,
        access,
        view,
    }
}

const ADMIN: Access = Access::Role(Role::Admin);

#[rustfmt::skip]
pub const ROUTES: &[RouteDef] = &[
    route("/", Public, View::Home),
    route("/login", Public, View::Login),
    route("/register", Public, View::Register),
    route("/forgot-password", Public, View::ForgotPassword),
    route("/about-us", Public, View::AboutUs),
    route("/gallery", Public, View::Gallery),
    route("/contact-us", Public, View::ContactUs),
    route("/pets", Public, View::AllPets),
    route("/all-pets", Public, View::AllPetsPage),
    route("/pet/:petId", Public, View::PetDetail),
    // admin
    route("/dashboard/admin", ADMIN, View::AdminDashboard),
    route("/dashboard/admin/manage-users", ADMIN, View::ManageUsers),
    route("/dashboard/admin/manage-shelters", ADMIN, View::ManageShelters),
    route("/dashboard/admin/manage-vets", ADMIN, View::ManageVets),
    route("/dashboard/admin/manage-pets", ADMIN, View::ManagePets),
    route("/dashboard/admin/create-announcement", ADMIN, View::CreateAnnouncement),
    route("/dashboard/admin/manage-announcements", ADMIN, View::ManageAnnouncements),
    route("/dashboard/admin/contact-messages", ADMIN, View::AdminContactMessages),
    // vet
    route("/dashboard/vet", Authenticated, View::VetDashboard),
    route("/dashboard/vet/records", Authenticated, View::VetHealthRecords),
    route("/dashboard/vet/patients", Authenticated, View::VetPatients),
    route("/dashboard/vet/appointment-requests", Authenticated, View::VetAppointmentRequests),
    route("/dashboard/vet/emergency-cases", Authenticated, View::VetEmergencyCases),
    route("/dashboard/vet/create-blog", Authenticated, View::VetCreateBlogPost),
    route("/dashboard/vet/manage-blogs", Authenticated, View::VetManageBlogPosts),
    route("/dashboard/vet/send-health-record", Authenticated, View::SendHealthRecord),
    // user
    route("/dashboard/user", Authenticated, View::UserDashboard),
    route("/dashboard/user/appointment-request", Authenticated, View::UserAppointmentRequest),
    route("/dashboard/user/appointment-requests", Authenticated, View::UserAppointmentRequests),
    route("/dashboard/user/health-records", Authenticated, View::UserHealthRecords),
    route("/dashboard/user/applications", DashboardLayout, View::UserApplications),
    route("/dashboard/user/favorites", DashboardLayout, View::UserFavorites),
    route("/dashboard/user/pets", DashboardLayout, View::AllPetsPage),
    // shelter
    route("/dashboard/shelter", Authenticated, View::ShelterDashboard),
    route("/dashboard/shelter/add", Authenticated, View::AddPet),
    route("/dashboard/shelter/add-pet", DashboardLayout, View::AddPet),
    route("/dashboard/shelter/applications", DashboardLayout, View::AdoptionRequests),
    route("/dashboard/shelter/stray-reports", Authenticated, View::StrayPetReports),
    route("/dashboard/shelter/adoption-requests", Authenticated, View::AdoptionRequests),
    route("/dashboard/shelter/requests", Authenticated, View::AdoptionRequests),
    route("/dashboard/shelter/pets", Authenticated, View::ShelterPets),
    route("/dashboard/shelter/edit-pet/:petId", Authenticated, View::EditPet),
    route("/dashboard/shelter/health", Authenticated, View::VetHealthRecords),
    // shared, login required
    route("/stray-pet-report", Authenticated, View::StrayPetReport),
    route("/adopt/:petId", Authenticated, View::AdoptionApplication),
    route("/my-adopted-pets", Authenticated, View::MyAdoptedPets),
    route("/adoption-application/:applicationId", Authenticated, View::AdoptionApplicationDetails),
    route("/dashboard", Access::DashboardRedirect, View::NotFound),
];

/// Captured `:name` segments.
pub type Params = BTreeMap<&'static str, String>;

/// One dispatch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Render { view: View, params: Params },
    Redirect(String),
}

/// Final result of following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Path actually rendered.
    pub path: String,
    pub view: View,
    pub params: Params,
    /// Intermediate redirect targets, in order.
    pub redirects: Vec<String>,
}

pub struct ViewDispatcher {
    guard: RouteGuard,
    redirector: DashboardRedirector,
    eligibility: Arc<EligibilityGate>,
}

impl ViewDispatcher {
    pub fn new(
        guard: RouteGuard,
        redirector: DashboardRedirector,
        eligibility: Arc<EligibilityGate>,
    ) -> Self {
        Self {
            guard,
            redirector,
            eligibility,
        }
    }

    /// Single step: find the route, run its guard.
    pub fn dispatch(&self, path: &str) -> Dispatch {
        self.eligibility.supersede();

        let clean = strip_query(path);
        let Some((def, params)) = match_route(clean) else {
            debug!(path = clean, "no route");
            return Dispatch::Render {
                view: View::NotFound,
                params: Params::new(),
            };
        };

        let decision = match def.access {
            Access::Public => GuardDecision::Allow,
            Access::Authenticated => self.guard.check(&StrictRoleGuard::new(None), clean),
            Access::Role(role) => self.guard.check(&StrictRoleGuard::new(Some(role)), clean),
            Access::DashboardLayout => self
                .guard
                .check(&SelfCorrectingGuard::dashboard_layout(), clean),
            Access::DashboardRedirect => GuardDecision::RedirectTo(self.redirector.resolve()),
        };

        match decision {
            GuardDecision::Allow => Dispatch::Render {
                view: def.view,
                params,
            },
            GuardDecision::RedirectTo(to) => Dispatch::Redirect(to),
        }
    }

    /// Follow redirects until a view renders.
    ///
    /// # Errors
    /// `DomainError::Ui` if the redirect chain does not settle.
    pub fn navigate(&self, path: &str) -> Result<Navigation, DomainError> {
        let mut current = path.to_string();
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            match self.dispatch(&current) {
                Dispatch::Render { view, params } => {
                    info!(path = %current, ?view, hops = redirects.len(), "navigated");
                    return Ok(Navigation {
                        path: current,
                        view,
                        params,
                        redirects,
                    });
                }
                Dispatch::Redirect(to) => {
                    redirects.push(to.clone());
                    current = to;
                }
            }
        }
        Err(DomainError::Ui(format!(
            "redirect loop starting at {}: {:?}",
            path, redirects
        )))
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// First route whose pattern matches `path`, with its captured params.
pub fn match_route(path: &str) -> Option<(&'static RouteDef, Params)> {
    let wanted: Vec<&str> = segments(path).collect();
    ROUTES.iter().find_map(|def| {
        let pattern: Vec<&'static str> = segments(def.pattern).collect();
        if pattern.len() != wanted.len() {
            return None;
        }
        let mut params = Params::new();
        for (p, w) in pattern.iter().copied().zip(wanted.iter().copied()) {
            match p.strip_prefix(':') {
                Some(name) => {
                    params.insert(name, w.to_string());
                }
                None if p == w => {}
                None => return None,
            }
        }
        Some((def, params))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::MockBackend;
    use crate::adapters::persistence::MemoryStorage;
    use crate::domain::UserId;
    use crate::usecases::session_store::SessionStore;

    async fn dispatcher(role: Option<Role>) -> ViewDispatcher {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        if let Some(role) = role {
            session.set_session("t1", UserId(42), role, "Test").await;
        }
        let gate = Arc::new(EligibilityGate::new(
            Arc::new(MockBackend::new()),
            Arc::clone(&session),
        ));
        ViewDispatcher::new(
            RouteGuard::new(Arc::clone(&session)),
            DashboardRedirector::new(session),
            gate,
        )
    }

    fn render(view: View) -> Dispatch {
        Dispatch::Render {
            view,
            params: Params::new(),
        }
    }

    #[test]
    fn test_match_route_captures_params() {
        let (def, params) = match_route("/pet/17").unwrap();
        assert_eq!(def.view, View::PetDetail);
        assert_eq!(params["petId"], "17");

        let (def, params) = match_route("/dashboard/shelter/edit-pet/3/").unwrap();
        assert_eq!(def.view, View::EditPet);
        assert_eq!(params["petId"], "3");

        assert!(match_route("/pet").is_none());
        assert!(match_route("/nowhere").is_none());
    }

    #[test]
    fn test_every_pattern_matches_itself() {
        for def in ROUTES {
            let (found, _) = match_route(def.pattern).unwrap();
            assert_eq!(found.pattern, def.pattern);
        }
    }

    #[tokio::test]
    async fn test_public_routes_need_no_session() {
        let d = dispatcher(None).await;
        assert_eq!(d.dispatch("/"), render(View::Home));
        assert_eq!(d.dispatch("/gallery?tab=cats"), render(View::Gallery));
        assert_eq!(d.dispatch("/does/not/exist"), render(View::NotFound));
    }

    #[tokio::test]
    async fn test_admin_routes_bounce_other_roles_to_login() {
        let d = dispatcher(Some(Role::Shelter)).await;
        assert_eq!(
            d.dispatch("/dashboard/admin/manage-users"),
            Dispatch::Redirect("/login".into())
        );
        let d = dispatcher(Some(Role::Admin)).await;
        assert_eq!(
            d.dispatch("/dashboard/admin/manage-users"),
            render(View::ManageUsers)
        );
    }

    #[tokio::test]
    async fn test_authenticated_routes() {
        let d = dispatcher(None).await;
        assert_eq!(d.dispatch("/adopt/5"), Dispatch::Redirect("/login".into()));

        let d = dispatcher(Some(Role::User)).await;
        let mut params = Params::new();
        params.insert("petId", "5".into());
        assert_eq!(
            d.dispatch("/adopt/5"),
            Dispatch::Render {
                view: View::AdoptionApplication,
                params
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_entry_resolves_by_role() {
        for role in Role::ALL {
            let d = dispatcher(Some(role)).await;
            assert_eq!(d.dispatch("/dashboard"), Dispatch::Redirect(role.dashboard_path()));
        }
        let d = dispatcher(None).await;
        assert_eq!(d.dispatch("/dashboard/"), Dispatch::Redirect("/login".into()));
    }

    #[tokio::test]
    async fn test_layout_routes_self_correct() {
        let d = dispatcher(Some(Role::User)).await;
        assert_eq!(
            d.dispatch("/dashboard/shelter/add-pet"),
            Dispatch::Redirect("/dashboard/user".into())
        );
        assert_eq!(
            d.dispatch("/dashboard/user/favorites"),
            render(View::UserFavorites)
        );
        assert_eq!(d.dispatch("/dashboard/user/pets"), render(View::AllPetsPage));

        let d = dispatcher(Some(Role::Shelter)).await;
        assert_eq!(
            d.dispatch("/dashboard/user/pets"),
            Dispatch::Redirect("/dashboard/shelter".into())
        );

        let d = dispatcher(Some(Role::Vet)).await;
        assert_eq!(
            d.dispatch("/dashboard/user/favorites"),
            Dispatch::Redirect("/login".into())
        );
    }

    #[tokio::test]
    async fn test_navigate_follows_redirects() {
        let d = dispatcher(Some(Role::Shelter)).await;
        let nav = d.navigate("/dashboard").unwrap();
        assert_eq!(nav.view, View::ShelterDashboard);
        assert_eq!(nav.path, "/dashboard/shelter");
        assert_eq!(nav.redirects, vec!["/dashboard/shelter".to_string()]);

        let nav = d.navigate("/dashboard/user/applications").unwrap();
        assert_eq!(nav.view, View::ShelterDashboard);

        let d = dispatcher(None).await;
        let nav = d.navigate("/dashboard/vet/records").unwrap();
        assert_eq!(nav.view, View::Login);
        assert_eq!(nav.redirects, vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_supersedes_pending_checks() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let gate = Arc::new(EligibilityGate::new(
            Arc::new(MockBackend::new()),
            Arc::clone(&session),
        ));
        let d = ViewDispatcher::new(
            RouteGuard::new(Arc::clone(&session)),
            DashboardRedirector::new(Arc::clone(&session)),
            Arc::clone(&gate),
        );

        let ticket = gate.begin_check();
        assert!(gate.is_current(ticket));
        d.dispatch("/gallery");
        assert!(!gate.is_current(ticket));
    }
}
