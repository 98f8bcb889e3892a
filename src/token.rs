//! Session token payload decoding.
//!
//! Tokens are JWT-shaped bearer credentials issued by the auth backend:
//! three dot-separated base64url segments, the middle one carrying the JSON
//! profile claims. Only that payload segment is read here. The signature is
//! never checked locally; the backend that issued the token is the
//! verification authority, and a forged-but-well-formed token is not
//! detectable on the client.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Avatar path rendered when a profile carries no usable photo URL.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Profile claims carried in the payload segment of a session token.
///
/// Unknown claims (`iat`, `exp`, provider ids, …) are ignored; `displayName`
/// and `email` are required for the decode to succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Name shown on the profile card.
    pub display_name: String,
    /// Email address shown on the profile card.
    pub email: String,
    /// Photo URL. Absent (or empty) when the provider supplied none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl UserProfile {
    /// The photo URL to render, falling back to [`DEFAULT_AVATAR`] when the
    /// token carried no photo or an empty one.
    pub fn avatar_url(&self) -> &str {
        match self.photo.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_AVATAR,
        }
    }
}

/// The error type for token decoding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenDecodeError {
    /// The token does not have the `header.payload.signature` shape.
    #[error("malformed token: expected 3 segments, found {0}")]
    Segments(usize),
    /// The payload segment is not valid base64url.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The payload decoded but is not a valid claims object.
    #[error("claims error: {0}")]
    Claims(String),
}

/// Decodes the payload segment of `token` into a [`UserProfile`].
///
/// This is claims extraction, not verification: any well-formed token
/// decodes, whoever minted it.
pub fn decode_profile(token: &str) -> Result<UserProfile, TokenDecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenDecodeError::Segments(segments.len()));
    }
    let payload = URL_SAFE_NO_PAD.decode(segments[1])?;
    serde_json::from_slice(&payload).map_err(|e| TokenDecodeError::Claims(e.to_string()))
}
