//! Construction-time error types
//!
//! Request-time failures have their own taxonomy in the client crate; this
//! error covers what can go wrong before any request is sent (bad base URL,
//! zero timeout, transport construction).

use thiserror::Error;

/// Error raised while building a client from configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let err = Error::Config("base_url must start with http".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: base_url must start with http"
        );
    }

    #[test]
    fn error_debug_includes_variant() {
        let err = Error::Config("zero timeout".into());
        let debug = format!("{err:?}");
        assert!(
            debug.contains("Config"),
            "Debug should include variant name, got: {debug}"
        );
    }
}
