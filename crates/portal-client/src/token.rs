//! Access credential and the in-memory token slot
//!
//! The access credential is a JWT-shaped bearer string whose payload
//! carries an `exp` claim. The client never verifies the signature (that
//! is the server's job); it only decodes the expiry so the 401 protocol
//! can tell "expired, refresh and retry" apart from "rejected outright".
//!
//! Decoding fails closed: a credential whose expiry cannot be read is
//! treated as already expired, which routes it into the refresh path
//! instead of silently reusing a malformed token.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::Secret;
use serde::Deserialize;

/// JWT payload fields the client cares about. Everything else in the
/// token is opaque.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Expiry as unix seconds
    exp: u64,
}

/// A short-lived bearer credential with its decoded expiry.
///
/// Held in memory only; writing it to durable storage anywhere is a
/// security defect, not a style choice. Debug output redacts the bearer
/// string via [`Secret`].
#[derive(Debug, Clone)]
pub struct AccessToken {
    bearer: Secret<String>,
    /// Decoded `exp` claim; `None` when the token could not be decoded
    expires_at: Option<u64>,
}

impl AccessToken {
    /// Wrap a raw bearer string, decoding its expiry eagerly.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let expires_at = decode_expiry(&raw);
        Self {
            bearer: Secret::new(raw),
            expires_at,
        }
    }

    /// The raw bearer string for the Authorization header.
    pub fn bearer(&self) -> &str {
        self.bearer.expose()
    }

    /// Whether the credential is expired at `now` (unix seconds).
    ///
    /// `leeway` shrinks the credential's lifetime: with a 5-second leeway a
    /// token is reported expired 5 seconds before its embedded deadline.
    /// Fails closed: an undecodable expiry is always expired.
    pub fn is_expired_at(&self, now: u64, leeway: Duration) -> bool {
        match self.expires_at {
            Some(exp) => now + leeway.as_secs() >= exp,
            None => true,
        }
    }

    /// [`is_expired_at`](Self::is_expired_at) against the system clock.
    pub fn is_expired(&self, leeway: Duration) -> bool {
        self.is_expired_at(unix_now(), leeway)
    }
}

/// Decode the `exp` claim from a JWT without verifying the signature.
///
/// Returns `None` for anything that doesn't decode: wrong segment count,
/// invalid base64, payload that isn't JSON, or a missing `exp`.
fn decode_expiry(raw: &str) -> Option<u64> {
    let payload = raw.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

/// Unix seconds from the system clock.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Process-wide slot holding zero-or-one live credential, in memory only.
///
/// Reads are open to anyone; writes are deliberately crate-private so the
/// only writers are the request pipeline and the refresh coordinator.
/// Collaborating code installs or clears credentials through
/// [`ApiClient`](crate::ApiClient), never by mutating the holder directly.
pub struct TokenHolder {
    slot: RwLock<Option<AccessToken>>,
}

impl TokenHolder {
    /// An empty holder.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Clone of the held credential, if any.
    pub fn get(&self) -> Option<AccessToken> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overwrite the slot. No history is retained.
    pub(crate) fn set(&self, token: Option<AccessToken>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

impl Default for TokenHolder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an unsigned JWT-shaped token with the given `exp` claim.
#[cfg(test)]
pub(crate) fn jwt_expiring_at(exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"type":"access"}}"#));
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_expiry_from_payload() {
        let token = AccessToken::new(jwt_expiring_at(1_900_000_000));
        assert!(!token.is_expired_at(1_899_999_999, Duration::ZERO));
    }

    #[test]
    fn expired_exactly_at_deadline_with_zero_leeway() {
        let token = AccessToken::new(jwt_expiring_at(1000));
        assert!(!token.is_expired_at(999, Duration::ZERO));
        assert!(token.is_expired_at(1000, Duration::ZERO));
        assert!(token.is_expired_at(1001, Duration::ZERO));
    }

    #[test]
    fn leeway_moves_the_deadline_earlier() {
        let token = AccessToken::new(jwt_expiring_at(1000));
        let leeway = Duration::from_secs(5);
        assert!(!token.is_expired_at(994, leeway));
        assert!(token.is_expired_at(995, leeway));
    }

    #[test]
    fn garbage_token_is_expired() {
        let token = AccessToken::new("not-a-jwt");
        assert!(token.is_expired_at(0, Duration::ZERO));
    }

    #[test]
    fn invalid_base64_payload_is_expired() {
        let token = AccessToken::new("header.!!not-base64!!.sig");
        assert!(token.is_expired_at(0, Duration::ZERO));
    }

    #[test]
    fn payload_without_exp_is_expired() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"42"}"#);
        let token = AccessToken::new(format!("h.{payload}.s"));
        assert!(token.is_expired_at(0, Duration::ZERO));
    }

    #[test]
    fn debug_never_leaks_the_bearer() {
        let raw = jwt_expiring_at(1_900_000_000);
        let token = AccessToken::new(raw.clone());
        let debug = format!("{token:?}");
        assert!(!debug.contains(&raw), "bearer leaked: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn holder_starts_empty() {
        let holder = TokenHolder::new();
        assert!(holder.get().is_none());
    }

    #[test]
    fn holder_overwrites_and_clears() {
        let holder = TokenHolder::new();
        holder.set(Some(AccessToken::new(jwt_expiring_at(100))));
        holder.set(Some(AccessToken::new(jwt_expiring_at(200))));

        let held = holder.get().unwrap();
        assert_eq!(held.expires_at, Some(200), "set must overwrite, not stack");

        holder.set(None);
        assert!(holder.get().is_none());
    }
}
