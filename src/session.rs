use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::api::models::User;
use crate::storage::SessionStorage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user: User,
}

/// Current identity, shared by the transport and every view.
///
/// Memory is the primary copy; storage is read once by [`SessionStore::open`]
/// and consulted again only when memory is empty. There is no expiry: a stale
/// token is noticed when the server rejects it.
#[derive(Debug)]
pub struct SessionStore {
    storage: SessionStorage,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn open(storage: SessionStorage) -> Self {
        let current = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("could not read stored session: {e}");
                None
            }
        };
        if let Some(session) = &current {
            log::info!("restored session for {}", session.user.email);
        }
        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(SessionStorage::ephemeral())
    }

    pub fn login(&self, user: User, session_id: impl Into<String>) {
        let session = Session {
            session_id: session_id.into(),
            user,
        };
        if let Err(e) = self.storage.save(&session) {
            log::warn!("could not persist session: {e}");
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            log::warn!("could not clear stored session: {e}");
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn session(&self) -> Option<Session> {
        let memory = self
            .current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        memory.or_else(|| self.storage.load().ok().flatten())
    }

    pub fn session_id(&self) -> Option<String> {
        self.session().map(|s| s.session_id)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RemoteId, Role};

    fn ana() -> User {
        User {
            id: RemoteId::new("u1"),
            name: "Ana".into(),
            email: "cliente@x.com".into(),
            role: Role::Cliente,
        }
    }

    #[test]
    fn login_then_logout() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        store.login(ana(), "s1");
        assert_eq!(store.session_id().as_deref(), Some("s1"));
        assert_eq!(store.current_user(), Some(ana()));
        store.logout();
        assert_eq!(store.session_id(), None);
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn reopening_restores_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        SessionStore::open(SessionStorage::at(&path)).login(ana(), "s1");

        let reopened = SessionStore::open(SessionStorage::at(&path));
        assert_eq!(reopened.session_id().as_deref(), Some("s1"));

        reopened.logout();
        assert!(!SessionStore::open(SessionStorage::at(&path)).is_authenticated());
    }

    #[test]
    fn falls_back_to_storage_when_memory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let store = SessionStore::open(SessionStorage::at(&path));
        assert_eq!(store.session_id(), None);

        // another writer drops a session file after startup
        SessionStorage::at(&path)
            .save(&Session {
                session_id: "s2".into(),
                user: ana(),
            })
            .unwrap();
        assert_eq!(store.session_id().as_deref(), Some("s2"));
    }

    #[test]
    fn corrupt_storage_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [toml").unwrap();
        assert!(!SessionStore::open(SessionStorage::at(&path)).is_authenticated());
    }
}
