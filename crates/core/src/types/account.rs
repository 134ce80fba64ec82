//! The logged-in user record and profile updates.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Account role, as stored alongside the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

/// The logged-in user, injected into stores via the session context rather
/// than read from ambient storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub image: Option<String>,
}

impl UserRecord {
    /// Display name in Vietnamese order (family name first).
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.lastname, self.firstname)
            .trim()
            .to_string()
    }
}

/// Editable profile fields for `PUT /users/{id}`.
///
/// An empty password means "keep the current one" and is omitted from the
/// request entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileUpdate {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Password to send, if the user actually typed one.
    #[must_use]
    pub fn password_to_send(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_family_first() {
        let user = UserRecord {
            id: UserId::new(1),
            firstname: "An".to_string(),
            lastname: "Trần".to_string(),
            email: "an@example.com".to_string(),
            phone: None,
            role: Role::Customer,
            image: None,
        };
        assert_eq!(user.full_name(), "Trần An");
    }

    #[test]
    fn test_empty_password_not_sent() {
        let update = ProfileUpdate {
            password: Some(String::new()),
            ..ProfileUpdate::default()
        };
        assert_eq!(update.password_to_send(), None);

        let update = ProfileUpdate {
            password: Some("hunter2abc".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(update.password_to_send(), Some("hunter2abc"));
    }
}
