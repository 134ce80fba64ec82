//! Contact form message with inline validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload for `POST /contacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactMessage {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Inline validation failure; nothing is sent until these pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("name is required")]
    MissingName,
    #[error("phone number is required")]
    MissingPhone,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("subject is required")]
    MissingSubject,
    #[error("message body is required")]
    MissingMessage,
}

impl ContactMessage {
    /// Check required fields and a minimal email shape.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingName);
        }
        if self.phone.trim().is_empty() {
            return Err(ContactError::MissingPhone);
        }
        if !is_plausible_email(&self.email) {
            return Err(ContactError::InvalidEmail);
        }
        if self.subject.trim().is_empty() {
            return Err(ContactError::MissingSubject);
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::MissingMessage);
        }
        Ok(())
    }
}

/// Minimal shape check: one `@` with a dotted domain after it. The server
/// does its own validation; this only catches obvious typos before sending.
fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
