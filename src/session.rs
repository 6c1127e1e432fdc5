//! Process-wide session state.
//!
//! Routing guards and the UI shell consume only two facts from here: whether
//! a session exists and what permissions it carries. The refresh pipeline is
//! the sole writer besides explicit login/logout.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::info;

use crate::models::{TokenPair, User};

/// An established session: the authenticated user and the token pair that
/// backs it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Cloneable handle to the single session slot of the process.
///
/// The watch channel carries the authenticated flag so guards can react to a
/// logout triggered from deep inside the HTTP pipeline (the web client
/// hard-navigated to /login instead; a library can only signal).
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
    authenticated_tx: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (authenticated_tx, _) = watch::channel(false);
        SessionHandle {
            inner: Arc::new(RwLock::new(None)),
            authenticated_tx: Arc::new(authenticated_tx),
        }
    }

    fn write(&self, value: Option<Session>) {
        let authenticated = value.is_some();
        match self.inner.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
        // send_replace rather than send: the flag must update even with no
        // guard subscribed yet.
        self.authenticated_tx.send_replace(authenticated);
    }

    fn read(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Establish a session after a successful login.
    pub fn establish(&self, user: User, tokens: TokenPair) {
        info!("Session established for user '{}'", user.username);
        self.write(Some(Session { user, tokens }));
    }

    /// Replace the session's token pair after a successful refresh. A refresh
    /// arriving with no session in place (e.g. tokens restored from disk but
    /// no /Auth/me yet) leaves the slot untouched.
    pub fn update_tokens(&self, tokens: &TokenPair) {
        let updated = self.read().map(|mut session| {
            session.tokens = tokens.clone();
            session
        });
        if let Some(session) = updated {
            self.write(Some(session));
        }
    }

    /// Drop the session. Used by explicit logout and by terminal refresh
    /// failure.
    pub fn clear(&self) {
        if self.read().is_some() {
            info!("Session cleared");
        }
        self.write(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().map(|session| session.user)
    }

    pub fn permissions(&self) -> Vec<String> {
        self.read()
            .map(|session| session.user.permissions)
            .unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.read()
            .map(|session| session.user.has_permission(permission))
            .unwrap_or(false)
    }

    /// Subscribe to the authenticated flag. The receiver sees every
    /// login/logout edge, including logouts forced by refresh failure.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.authenticated_tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        SessionHandle::new()
    }
}
