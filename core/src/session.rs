//! Client-side identity state attached to every outgoing request.
//!
//! # Design
//! `SessionStore` is an explicitly constructed handle rather than a global.
//! Clones share one record behind an `RwLock`, so the client and whatever
//! code performs a login can hold their own handle. Writes are last-write-wins;
//! readers always see a complete record, never a half-updated one.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identity values the backend expects on each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub session_token: String,
    pub is_admin: bool,
}

impl Default for Session {
    /// Placeholder identity used before a real login populates the store.
    fn default() -> Self {
        Self {
            user_id: "2366".to_string(),
            session_token: "session_token_123".to_string(),
            is_admin: false,
        }
    }
}

/// Shared handle to the current [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Replace user id and session token. No validation is applied.
    pub fn set_user_data(&self, user_id: impl Into<String>, session_token: impl Into<String>) {
        let mut session = self.write();
        session.user_id = user_id.into();
        session.session_token = session_token.into();
    }

    pub fn set_admin(&self, status: bool) {
        self.write().is_admin = status;
    }

    pub fn user_id(&self) -> String {
        self.read().user_id.clone()
    }

    /// The session token sent as the `session_id` header.
    pub fn key(&self) -> String {
        self.read().session_token.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.read().is_admin
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    // The record is plain data, so a panic in another holder cannot leave it
    // in a state worth refusing to read.
    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
