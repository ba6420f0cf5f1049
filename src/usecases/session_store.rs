//! Session store: single source of truth for who is using the client.
//!
//! - Reads are synchronous over an in-memory snapshot (guards never await)
//! - Writes persist through StoragePort first, then swap the snapshot in one step
//! - Any storage failure is logged and leaves the store without a session (fail-closed)

use crate::domain::{DomainError, Role, Session, UserId};
use crate::ports::StoragePort;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Storage slot names. Shared with sessions written by the web front-end.
pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const ROLE_KEY: &str = "role";
pub const DISPLAY_NAME_KEY: &str = "userName";
/// Older front-end builds stored only the login email.
const EMAIL_KEY: &str = "email";

pub struct SessionStore {
    storage: Arc<dyn StoragePort>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Empty store. Call [`SessionStore::load`] to pick up a persisted session.
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// Build and load in one go.
    pub async fn open(storage: Arc<dyn StoragePort>) -> Self {
        let store = Self::new(storage);
        store.load().await;
        store
    }

    /// Reload the snapshot from storage (startup, or after another writer).
    pub async fn load(&self) {
        let loaded = match self.storage.load().await {
            Ok(slots) => match session_from_slots(&slots) {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "discarding inconsistent stored session");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "session storage unavailable; treating as logged out");
                None
            }
        };
        match &loaded {
            Some(s) => info!(user_id = %s.user_id, role = %s.role, "session restored"),
            None => debug!("no stored session"),
        }
        self.replace(loaded);
    }

    /// Overwrite the whole session. Readers see either the old or the new value, never a mix.
    pub async fn set_session(
        &self,
        token: impl Into<String>,
        user_id: UserId,
        role: Role,
        display_name: impl Into<String>,
    ) {
        let session = Session::new(token, user_id, role, display_name);
        if session.token.trim().is_empty() {
            warn!(user_id = %session.user_id, "refusing to store session without token");
            self.replace(None);
            self.wipe_storage().await;
            return;
        }
        let user_id_str = session.user_id.to_string();
        let entries = [
            (TOKEN_KEY, session.token.as_str()),
            (USER_ID_KEY, user_id_str.as_str()),
            (ROLE_KEY, session.role.as_str()),
            (DISPLAY_NAME_KEY, session.display_name.as_str()),
        ];

        match self.storage.replace_all(&entries).await {
            Ok(()) => {
                info!(user_id = %session.user_id, role = %session.role, "session stored");
                self.replace(Some(session));
            }
            Err(e) => {
                warn!(error = %e, "failed to persist session; staying logged out");
                self.replace(None);
                // The previous session may still be on disk.
                self.wipe_storage().await;
            }
        }
    }

    /// Drop every field. Idempotent.
    pub async fn clear_session(&self) {
        self.replace(None);
        self.wipe_storage().await;
        info!("session cleared");
    }

    /// Remove persisted slots. If `clear` fails, overwrite with an empty slot set
    /// so a restart cannot bring the session back.
    async fn wipe_storage(&self) {
        let Err(e) = self.storage.clear().await else {
            return;
        };
        warn!(error = %e, "failed to clear session storage; overwriting slots");
        if let Err(e) = self.storage.replace_all(&[]).await {
            warn!(error = %e, "failed to overwrite session storage");
        }
    }

    /// Copy of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().cloned())
    }

    pub fn get_role(&self) -> Option<Role> {
        self.with_session(|s| s.role)
    }

    pub fn get_user_id(&self) -> Option<UserId> {
        self.with_session(|s| s.user_id)
    }

    pub fn get_display_name(&self) -> Option<String> {
        self.with_session(|s| s.display_name.clone())
    }

    /// Bearer token for authenticated backend calls.
    pub fn get_token(&self) -> Option<String> {
        self.with_session(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_session(|_| ()).is_some()
    }

    fn with_session<T>(&self, f: impl FnOnce(&Session) -> T) -> Option<T> {
        // A poisoned lock reads as "no session".
        self.current.read().ok().and_then(|guard| guard.as_ref().map(f))
    }

    fn replace(&self, session: Option<Session>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = session;
    }
}

/// Rebuild a session from storage slots.
///
/// No token means no session. A token without a valid user id or role is an
/// inconsistent session and is rejected rather than half-loaded.
fn session_from_slots(slots: &HashMap<String, String>) -> Result<Option<Session>, DomainError> {
    let token = match slots.get(TOKEN_KEY).map(|t| t.trim()) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Ok(None),
    };

    let user_id = slots
        .get(USER_ID_KEY)
        .ok_or_else(|| DomainError::InvalidSession("token without user id".into()))?
        .parse::<UserId>()
        .map_err(|e| DomainError::InvalidSession(format!("bad user id: {}", e)))?;

    let role = slots
        .get(ROLE_KEY)
        .ok_or_else(|| DomainError::InvalidSession("token without role".into()))?
        .parse::<Role>()
        .map_err(|e| DomainError::InvalidSession(e.to_string()))?;

    let display_name = slots
        .get(DISPLAY_NAME_KEY)
        .or_else(|| slots.get(EMAIL_KEY))
        .cloned()
        .unwrap_or_default();

    Ok(Some(Session::new(token, user_id, role, display_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::{JsonFileStorage, MemoryStorage};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn memory_store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn StoragePort>);
        (storage, store)
    }

    #[tokio::test]
    async fn test_set_session_round_trip() {
        let (storage, store) = memory_store();
        store
            .set_session("t1", UserId(42), Role::Shelter, "Happy Paws")
            .await;

        assert!(store.is_authenticated());
        assert_eq!(store.get_role(), Some(Role::Shelter));
        assert_eq!(store.get_user_id(), Some(UserId(42)));
        assert_eq!(store.get_display_name().as_deref(), Some("Happy Paws"));
        assert_eq!(store.get_token().as_deref(), Some("t1"));

        let slots = storage.snapshot();
        assert_eq!(slots[TOKEN_KEY], "t1");
        assert_eq!(slots[USER_ID_KEY], "42");
        assert_eq!(slots[ROLE_KEY], "shelter");
    }

    #[tokio::test]
    async fn test_relogin_overwrites_everything() {
        let (_storage, store) = memory_store();
        store.set_session("t1", UserId(1), Role::Admin, "Root").await;
        store.set_session("t2", UserId(2), Role::Vet, "").await;

        let s = store.current().unwrap();
        assert_eq!(s.token, "t2");
        assert_eq!(s.user_id, UserId(2));
        assert_eq!(s.role, Role::Vet);
        assert_eq!(s.display_name, "");
    }

    #[tokio::test]
    async fn test_clear_session_is_idempotent() {
        let (storage, store) = memory_store();
        store.clear_session().await;
        assert!(!store.is_authenticated());

        store.set_session("t1", UserId(7), Role::User, "Ann").await;
        store.clear_session().await;
        store.clear_session().await;

        assert!(!store.is_authenticated());
        assert_eq!(store.get_role(), None);
        assert_eq!(store.get_user_id(), None);
        assert!(storage.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_load_restores_stored_session() {
        let storage = Arc::new(MemoryStorage::with_slots(&[
            ("token", "abc"),
            ("userId", "9"),
            ("role", "VET"),
            ("email", "doc@example.com"),
        ]));
        let store = SessionStore::open(storage).await;
        assert_eq!(store.get_role(), Some(Role::Vet));
        assert_eq!(store.get_user_id(), Some(UserId(9)));
        assert_eq!(store.get_display_name().as_deref(), Some("doc@example.com"));
    }

    #[tokio::test]
    async fn test_load_rejects_token_without_role() {
        let storage = Arc::new(MemoryStorage::with_slots(&[
            ("token", "abc"),
            ("userId", "9"),
        ]));
        let store = SessionStore::open(storage).await;
        assert!(!store.is_authenticated());
        assert_eq!(store.get_user_id(), None);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_role() {
        let storage = Arc::new(MemoryStorage::with_slots(&[
            ("token", "abc"),
            ("userId", "9"),
            ("role", "superuser"),
        ]));
        let store = SessionStore::open(storage).await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_role_without_token_is_not_a_session() {
        let storage = Arc::new(MemoryStorage::with_slots(&[("role", "admin"), ("userId", "1")]));
        let store = SessionStore::open(storage).await;
        assert!(!store.is_authenticated());
        assert_eq!(store.get_role(), None);
    }

    #[tokio::test]
    async fn test_unavailable_storage_fails_closed() {
        let store = SessionStore::open(Arc::new(MemoryStorage::unavailable())).await;
        store.set_session("t1", UserId(1), Role::Admin, "Root").await;

        assert!(!store.is_authenticated());
        assert_eq!(store.get_role(), None);
        store.clear_session().await;
        assert!(!store.is_authenticated());
    }

    /// Storage whose `clear` and/or `replace_all` can be made to fail.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_clear: bool,
        fail_replace: AtomicBool,
    }

    #[async_trait::async_trait]
    impl StoragePort for FlakyStorage {
        async fn load(&self) -> Result<HashMap<String, String>, DomainError> {
            self.inner.load().await
        }

        async fn replace_all(&self, entries: &[(&str, &str)]) -> Result<(), DomainError> {
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(DomainError::Storage("write failed".into()));
            }
            self.inner.replace_all(entries).await
        }

        async fn clear(&self) -> Result<(), DomainError> {
            if self.fail_clear {
                return Err(DomainError::Storage("remove failed".into()));
            }
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_blank_token_is_not_a_session() {
        let (storage, store) = memory_store();
        store.set_session("t1", UserId(1), Role::Admin, "Root").await;

        for token in ["", "   "] {
            store.set_session(token, UserId(1), Role::Admin, "x").await;
            assert!(!store.is_authenticated(), "{token:?}");
            assert_eq!(store.get_role(), None);
        }
        assert!(storage.snapshot().is_empty());

        let reloaded = SessionStore::open(storage).await;
        assert!(!reloaded.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_survives_failing_clear() {
        let storage = Arc::new(FlakyStorage {
            fail_clear: true,
            ..FlakyStorage::default()
        });
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn StoragePort>);
        store.set_session("t1", UserId(1), Role::Admin, "Root").await;
        assert!(store.is_authenticated());

        store.clear_session().await;
        assert!(!store.is_authenticated());

        let reloaded = SessionStore::open(storage).await;
        assert!(!reloaded.is_authenticated());
        assert_eq!(reloaded.get_role(), None);
    }

    #[tokio::test]
    async fn test_failed_relogin_does_not_restore_previous_user() {
        let storage = Arc::new(FlakyStorage::default());
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn StoragePort>);
        store.set_session("t1", UserId(1), Role::Admin, "Root").await;

        storage.fail_replace.store(true, Ordering::SeqCst);
        store.set_session("t2", UserId(2), Role::User, "Ann").await;
        assert!(!store.is_authenticated());

        let reloaded = SessionStore::open(storage).await;
        assert!(!reloaded.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_survives_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = SessionStore::open(Arc::new(JsonFileStorage::new(&path))).await;
        first.set_session("t1", UserId(42), Role::User, "Ann").await;

        let second = SessionStore::open(Arc::new(JsonFileStorage::new(&path))).await;
        assert_eq!(second.current(), first.current());

        second.clear_session().await;
        let third = SessionStore::open(Arc::new(JsonFileStorage::new(&path))).await;
        assert!(!third.is_authenticated());
    }
}
