//! Resolves the bare `/dashboard` entry to the role's own dashboard.

use crate::domain::{Role, LOGIN_PATH};
use crate::usecases::session_store::SessionStore;
use std::sync::Arc;

pub struct DashboardRedirector {
    session: Arc<SessionStore>,
}

impl DashboardRedirector {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Destination for `/dashboard` under the current session.
    pub fn resolve(&self) -> String {
        destination_for(self.session.get_role())
    }
}

/// Total over every role; no role means login.
pub fn destination_for(role: Option<Role>) -> String {
    match role {
        Some(role) => role.dashboard_path(),
        None => LOGIN_PATH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryStorage;
    use crate::domain::UserId;

    #[test]
    fn test_destination_table() {
        assert_eq!(destination_for(Some(Role::Admin)), "/dashboard/admin");
        assert_eq!(destination_for(Some(Role::User)), "/dashboard/user");
        assert_eq!(destination_for(Some(Role::Shelter)), "/dashboard/shelter");
        assert_eq!(destination_for(Some(Role::Vet)), "/dashboard/vet");
        assert_eq!(destination_for(None), "/login");
    }

    #[tokio::test]
    async fn test_resolve_follows_session() {
        let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let redirector = DashboardRedirector::new(Arc::clone(&store));
        assert_eq!(redirector.resolve(), "/login");

        store.set_session("t", UserId(5), Role::Vet, "Dr. Lee").await;
        assert_eq!(redirector.resolve(), "/dashboard/vet");

        store.clear_session().await;
        assert_eq!(redirector.resolve(), "/login");
    }

    #[tokio::test]
    async fn test_unrecognized_stored_role_resolves_to_login() {
        let storage = Arc::new(MemoryStorage::with_slots(&[
            ("token", "t"),
            ("userId", "5"),
            ("role", "moderator"),
        ]));
        let store = Arc::new(SessionStore::open(storage).await);
        assert_eq!(DashboardRedirector::new(store).resolve(), "/login");
    }
}
