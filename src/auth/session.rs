//! Auth session persistence.
//!
//! The session holds the two values the client keeps between runs: the bearer
//! token and the role of the logged-in user. It is injected into the API client
//! rather than read from global state.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{auth::models::Role, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: String, role: Role) -> Self {
        Self {
            token: Some(token),
            role: Some(role),
            logged_in_at: Some(Utc::now()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Backing storage for a [`Session`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Session>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session> {
        Ok(self.inner.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().map_err(poisoned)? = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().map_err(poisoned)? = Session::default();
        Ok(())
    }
}

/// JSON file store; a missing file reads as an empty session.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => return Err(Error::SessionStore(e.to_string())),
        };

        serde_json::from_str(&raw).map_err(|e| Error::SessionStore(e.to_string()))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::SessionStore(e.to_string()))?;
        }

        let raw =
            serde_json::to_string_pretty(session).map_err(|e| Error::SessionStore(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| Error::SessionStore(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::SessionStore(e.to_string())),
        }
    }
}

/// Shared handle over a store, with the current session cached in memory.
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<dyn SessionStore>,
    current: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn open(store: Arc<dyn SessionStore>) -> Result<Self> {
        let current = store.load()?;
        Ok(Self {
            store,
            current: Arc::new(RwLock::new(current)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemorySessionStore::default()),
            current: Arc::new(RwLock::new(Session::default())),
        }
    }

    pub fn current(&self) -> Session {
        self.current
            .read()
            .map(|session| session.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current().token
    }

    pub fn role(&self) -> Option<Role> {
        self.current().role
    }

    pub fn set(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        *self.current.write().map_err(poisoned)? = session;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        *self.current.write().map_err(poisoned)? = Session::default();
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::SessionStore("session lock poisoned".to_string())
}
