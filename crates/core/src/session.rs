//! Session state owned by the caller.
//!
//! The engine itself is stateless between calls. Whoever drives it (the menu
//! loop, a test) keeps a [`Session`] and passes it to every operation that
//! needs an authenticated user.

use crate::models::User;
use crate::{LockerError, LockerResult};

/// `Anonymous` (no user) or `Authenticated` (one user).
#[derive(Clone, Debug, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Moves to `Authenticated`, replacing any previous user.
    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Moves to `Anonymous`. Calling it while anonymous is a no-op.
    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub fn current(&self) -> LockerResult<&User> {
        self.user.as_ref().ok_or(LockerError::NotAuthenticated)
    }
}
