//! The injected logged-in-user context.
//!
//! Stores and coordinators receive a `Session` at construction instead of
//! reading ambient storage. Lifecycle is explicit: `log_in` / `log_out`.
//! Mutating API calls short-circuit with [`ApiError::Unauthenticated`]
//! before any network traffic when no user is present.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use phutung_core::{UserId, UserRecord};

use crate::error::ApiError;

/// Shared session handle; cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

#[derive(Default)]
struct SessionState {
    user: Option<UserRecord>,
    token: Option<SecretString>,
}

impl Session {
    /// A session with nobody logged in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// A session pre-populated with a user, as after a completed login.
    #[must_use]
    pub fn logged_in(user: UserRecord, token: SecretString) -> Self {
        let session = Self::anonymous();
        session.log_in(user, token);
        session
    }

    /// Install a user and bearer token.
    pub fn log_in(&self, user: UserRecord, token: SecretString) {
        let mut state = self.write();
        state.user = Some(user);
        state.token = Some(token);
    }

    /// Clear the user and token.
    pub fn log_out(&self) {
        let mut state = self.write();
        state.user = None;
        state.token = None;
    }

    /// Replace the stored user record (e.g. after a profile update),
    /// keeping the existing token.
    pub fn update_user(&self, user: UserRecord) {
        self.write().user = Some(user);
    }

    /// The current user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserRecord> {
        self.read().user.clone()
    }

    /// The current user's ID, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.read().user.as_ref().map(|u| u.id)
    }

    /// The current user, or [`ApiError::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when nobody is logged in; callers map this
    /// to a redirect to the authentication entry point.
    pub fn require_user(&self) -> Result<UserRecord, ApiError> {
        self.current_user().ok_or(ApiError::Unauthenticated)
    }

    /// Bearer token value for authenticated requests.
    pub(crate) fn bearer_token(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.read().user.as_ref().map(|u| u.id))
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phutung_core::Role;

    fn user() -> UserRecord {
        UserRecord {
            id: UserId::new(9),
            firstname: "An".to_string(),
            lastname: "Trần".to_string(),
            email: "an@example.com".to_string(),
            phone: Some("0901234567".to_string()),
            role: Role::Customer,
            image: None,
        }
    }

    #[test]
    fn test_anonymous_requires_login() {
        let session = Session::anonymous();
        assert!(session.current_user().is_none());
        assert!(matches!(
            session.require_user(),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_login_logout_lifecycle() {
        let session = Session::anonymous();
        session.log_in(user(), SecretString::from("tok"));
        assert_eq!(session.user_id(), Some(UserId::new(9)));
        assert_eq!(session.bearer_token().as_deref(), Some("tok"));

        session.log_out();
        assert!(session.user_id().is_none());
        assert!(session.bearer_token().is_none());
    }

    #[test]
    fn test_update_user_keeps_token() {
        let session = Session::logged_in(user(), SecretString::from("tok"));
        let mut updated = user();
        updated.phone = None;
        session.update_user(updated);
        assert_eq!(session.bearer_token().as_deref(), Some("tok"));
        assert!(session.current_user().expect("user").phone.is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::anonymous();
        let other = session.clone();
        session.log_in(user(), SecretString::from("tok"));
        assert_eq!(other.user_id(), Some(UserId::new(9)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::logged_in(user(), SecretString::from("super-secret"));
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
