use std::sync::{Arc, RwLock};

use anyhow::Result;
use tracing::{debug, warn};

use crate::model::{role::Role, session::Session};
use crate::storage::LocalStorage;

pub const SESSION_KEY: &str = "auth";

/// Holds the signed-in identity.
///
/// Hydrated once from local storage when constructed, written back on every
/// change, and removed from storage as soon as no token is held.
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn hydrate(storage: Arc<dyn LocalStorage>) -> Self {
        let restored = storage
            .get_item(SESSION_KEY)
            .and_then(|raw| match serde_json::from_str::<Session>(&raw) {
                Ok(session) if !session.token.is_empty() => Some(session),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored session");
                    None
                }
            });

        debug!(restored = restored.is_some(), "Session store hydrated");

        Self {
            storage,
            current: RwLock::new(restored),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().ok().and_then(|s| s.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn login(&self, user_id: u64, token: String, username: String, role: Role) -> Result<()> {
        let session = Session {
            user_id,
            token,
            username,
            role,
        };
        self.replace(Some(session))
    }

    pub fn logout(&self) -> Result<()> {
        self.replace(None)
    }

    fn replace(&self, next: Option<Session>) -> Result<()> {
        let next = next.filter(|s| !s.token.is_empty());

        match &next {
            Some(session) => {
                let raw = serde_json::to_string(session)?;
                self.storage.set_item(SESSION_KEY, &raw)?;
            }
            None => self.storage.remove_item(SESSION_KEY)?,
        }

        let mut guard = self
            .current
            .write()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn session_survives_reload() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("local_storage.json");

        let store = SessionStore::hydrate(Arc::new(FileStorage::open(&path).unwrap()));
        store
            .login(7, "tok-123".into(), "asha".into(), Role::Hr)
            .unwrap();
        let before = store.current();
        drop(store);

        let reloaded = SessionStore::hydrate(Arc::new(FileStorage::open(&path).unwrap()));
        assert_eq!(reloaded.current(), before);
        assert_eq!(reloaded.token().as_deref(), Some("tok-123"));
    }

    #[test]
    fn nothing_is_restored_after_logout() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("local_storage.json");

        let store = SessionStore::hydrate(Arc::new(FileStorage::open(&path).unwrap()));
        store
            .login(1, "tok".into(), "root".into(), Role::Admin)
            .unwrap();
        store.logout().unwrap();
        assert!(store.current().is_none());
        drop(store);

        let reloaded = SessionStore::hydrate(Arc::new(FileStorage::open(&path).unwrap()));
        assert!(reloaded.current().is_none());
    }

    #[test]
    fn empty_token_clears_the_stored_entry() {
        let storage = Arc::new(MemoryStorage::default());
        let store = SessionStore::hydrate(storage.clone());
        store
            .login(1, "tok".into(), "root".into(), Role::Admin)
            .unwrap();
        assert!(storage.get_item(SESSION_KEY).is_some());

        store
            .login(1, String::new(), "root".into(), Role::Admin)
            .unwrap();
        assert!(storage.get_item(SESSION_KEY).is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn garbage_in_storage_hydrates_as_signed_out() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set_item(SESSION_KEY, "{not json").unwrap();

        let store = SessionStore::hydrate(storage);
        assert!(store.current().is_none());
    }
}
