//! Typed endpoint surface for the portal backend
//!
//! Thin, sequential wrappers over the core request pipeline in
//! `portal-client`. Each function maps one backend endpoint: it shapes
//! the payload, hands the call to [`ApiClient`](portal_client::ApiClient),
//! and reacts to the credential side of the result (install on login and
//! email verification, clear on logout). No coordination logic lives
//! here; the pipeline owns all of it.

pub mod admin;
pub mod auth;
pub mod password;
pub mod types;
