//! Secret wrapper for credentials held in memory

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value (bearer token, password) - redacted in Debug/Display
/// and zeroized when dropped, so credentials never end up in logs or
/// linger in freed memory.
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let secret = Secret::new(String::from("eyJhbGciOiJIUzI1NiJ9.e30.sig"));
        let debug = format!("{secret:?}");
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("eyJ"));
    }

    #[test]
    fn secret_redacts_display() {
        let secret = Secret::new(String::from("hunter2"));
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn secret_exposes_value() {
        let secret = Secret::new(String::from("at_token"));
        assert_eq!(secret.expose(), "at_token");
    }

    #[test]
    fn secret_clone_preserves_value() {
        let secret = Secret::new(String::from("at_token"));
        let copy = secret.clone();
        drop(secret);
        assert_eq!(copy.expose(), "at_token");
    }
}
