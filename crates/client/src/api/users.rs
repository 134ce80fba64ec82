//! Account endpoints.

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use phutung_core::{ProfileUpdate, UserRecord};

use crate::error::Result;
use crate::session::Session;

use super::wire::{Envelope, RawUser};
use super::ApiClient;

/// An avatar image to attach to a profile update.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ApiClient {
    /// Update the signed-in user's profile, optionally replacing the
    /// avatar. On success the session's user record is refreshed with what
    /// the server returned.
    ///
    /// An empty password field means "keep the current password" and is
    /// not sent at all.
    #[instrument(skip(self, session, update, avatar))]
    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
        avatar: Option<AvatarUpload>,
    ) -> Result<UserRecord> {
        let user = session.require_user()?;

        let mut form = Form::new()
            .text("firstname", update.firstname.clone())
            .text("lastname", update.lastname.clone())
            .text("email", update.email.clone());
        if let Some(phone) = &update.phone {
            form = form.text("phone", phone.clone());
        }
        if let Some(password) = update.password_to_send() {
            form = form.text("password", password.to_string());
        }
        if let Some(avatar) = avatar {
            let part = Part::bytes(avatar.bytes)
                .file_name(normalize_file_name(&avatar.file_name))
                .mime_str(&avatar.content_type)?;
            form = form.part("image", part);
        }

        let url = self.endpoint(&format!("users/{}", user.id))?;
        let mut request = self.http().put(url).multipart(form);
        if let Some(token) = session.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let envelope: Envelope<RawUser> = Self::decode(response, "user").await?;
        let mut updated = envelope.into_data("user")?.into_user()?;

        // The update endpoint omits the role; keep the one we already have.
        updated.role = user.role;
        session.update_user(updated.clone());
        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }
}

/// Make an upload file name safe for the backend's static file serving:
/// lowercase ASCII, non-alphanumeric runs collapsed to single dashes, the
/// extension preserved.
fn normalize_file_name(name: &str) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("upload");
    }
    if let Some(ext) = ext {
        out.push('.');
        out.push_str(&ext.to_ascii_lowercase());
    }
    out
}
