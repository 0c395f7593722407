//! Authenticated-request pipeline for the portal backend
//!
//! Owns the access-credential lifecycle for every call against the API:
//! attach the bearer, detect expiry, refresh once through a single-flight
//! rendezvous, retry exactly once, and classify whatever remains into a
//! closed error taxonomy.
//!
//! Request flow:
//! 1. [`ApiClient`] reads the [`TokenHolder`] and attaches the credential
//!    if one is held.
//! 2. A 401 with an expired credential routes through the refresh
//!    coordinator: at most one refresh call in flight process-wide, all
//!    concurrent callers awaiting the same outcome.
//! 3. The original request is retried exactly once with the refreshed
//!    credential; its outcome is terminal either way.
//!
//! The access credential lives in memory only. The long-lived session
//! marker is an HttpOnly cookie owned by the server and carried by the
//! transport's cookie store; this crate never sees or stores it.

pub mod client;
pub mod config;
pub mod error;
mod refresh;
pub mod token;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use reqwest::Method;
pub use token::{AccessToken, TokenHolder};
