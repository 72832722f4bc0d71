//! Encrypted cookie sessions.
//!
//! Sessions live entirely in a single encrypted, authenticated cookie named
//! `_session`. The payload carries the authenticated user's fid and an
//! optional one-shot flash message. Secrets rotate: the newest secret seals
//! new cookies, while every configured secret is tried when reading, so a
//! rotation does not immediately invalidate live sessions.

use cookie::{Cookie, CookieJar, Key, SameSite};
use ghostwriter_core::{Fid, FlashId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SessionError;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "_session";

/// Minimum length, in bytes, of a session secret.
const MIN_SECRET_BYTES: usize = 32;

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot message carried in the session and cleared when read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Unique per message, so clients can deduplicate redeliveries.
    pub id: FlashId,
    /// Severity.
    pub kind: FlashKind,
    /// Human-readable text.
    pub message: String,
}

impl FlashMessage {
    /// Creates a flash message with a fresh unique id.
    #[must_use]
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            id: FlashId::new(),
            kind,
            message: message.into(),
        }
    }
}

/// The decrypted session payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// The authenticated user's fid, if logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fid: Option<Fid>,
    /// Pending one-shot flash message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flash: Option<FlashMessage>,
}

impl SessionData {
    /// Creates an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session bound to a user.
    #[must_use]
    pub fn for_user(fid: Fid) -> Self {
        Self {
            fid: Some(fid),
            flash: None,
        }
    }

    /// Returns the authenticated user's fid, if any.
    #[must_use]
    pub fn user_fid(&self) -> Option<Fid> {
        self.fid
    }

    /// Returns true if a user is bound to this session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.fid.is_some()
    }

    /// Binds a user to this session, keeping any pending flash.
    pub fn log_in(&mut self, fid: Fid) {
        self.fid = Some(fid);
    }

    /// Stores a success flash message, replacing any pending one.
    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flash = Some(FlashMessage::new(FlashKind::Success, message));
    }

    /// Stores an error flash message, replacing any pending one.
    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash = Some(FlashMessage::new(FlashKind::Error, message));
    }

    /// Takes the pending flash message, clearing it.
    ///
    /// The cleared session must be committed for the clear to stick;
    /// otherwise the message is redelivered.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }

    /// Returns the pending flash message without clearing it.
    #[must_use]
    pub fn peek_flash(&self) -> Option<&FlashMessage> {
        self.flash.as_ref()
    }
}

/// Seals and opens `_session` cookies.
pub struct SessionManager {
    /// Keys derived from the configured secrets, newest first. The first
    /// key seals; all keys are tried when opening.
    keys: Vec<Key>,
    /// Whether to set the `Secure` attribute on the cookie.
    secure: bool,
}

// Keys carry secret material, so only their count is shown.
impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("keys", &self.keys.len())
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager from a rotating secret list.
    ///
    /// Secrets are ordered newest first. Each must be at least 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no secrets are given or any is too short.
    pub fn new(secrets: &[String], secure: bool) -> Result<Self, SessionError> {
        if secrets.is_empty() {
            return Err(SessionError::NoSecrets);
        }
        let mut keys = Vec::with_capacity(secrets.len());
        for (index, secret) in secrets.iter().enumerate() {
            if secret.len() < MIN_SECRET_BYTES {
                return Err(SessionError::SecretTooShort {
                    index,
                    minimum: MIN_SECRET_BYTES,
                });
            }
            keys.push(Key::derive_from(secret.as_bytes()));
        }
        Ok(Self { keys, secure })
    }

    /// Opens the session from a request's `Cookie` header.
    ///
    /// Returns an empty session when the header is absent, the cookie is
    /// missing, or the cookie fails to open under every configured secret.
    /// A tampered or stale cookie is indistinguishable from no cookie.
    #[must_use]
    pub fn read(&self, cookie_header: Option<&str>) -> SessionData {
        let Some(header) = cookie_header else {
            return SessionData::new();
        };

        let mut jar = CookieJar::new();
        for cookie in Cookie::split_parse_encoded(header.to_string()).flatten() {
            if cookie.name() == SESSION_COOKIE {
                jar.add_original(cookie);
            }
        }

        for key in &self.keys {
            if let Some(opened) = jar.private(key).get(SESSION_COOKIE) {
                match serde_json::from_str(opened.value()) {
                    Ok(data) => return data,
                    Err(e) => {
                        tracing::warn!(error = %e, "session cookie opened but payload was invalid");
                        return SessionData::new();
                    }
                }
            }
        }

        SessionData::new()
    }

    /// Seals a session into a `Set-Cookie`-ready cookie.
    ///
    /// Every response that mutated session state (login, logout, flash)
    /// must attach this cookie, or the mutation is silently dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn commit(&self, session: &SessionData) -> Result<Cookie<'static>, SessionError> {
        let payload =
            serde_json::to_string(session).map_err(|e| SessionError::Serialization {
                details: e.to_string(),
            })?;

        let cookie = Cookie::build((SESSION_COOKIE, payload))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();

        let mut jar = CookieJar::new();
        jar.private_mut(&self.keys[0]).add(cookie);
        jar.get(SESSION_COOKIE)
            .cloned()
            .ok_or(SessionError::Sealing)
    }

    /// Produces a cookie that clears the session.
    #[must_use]
    pub fn destroy(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }
}
