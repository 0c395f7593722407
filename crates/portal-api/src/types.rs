//! Wire types for the portal API
//!
//! The backend speaks camelCase JSON; the one exception is the password
//! reset payload, which is snake_case for historical reasons and kept
//! that way here.

use serde::{Deserialize, Serialize};

/// Account role. Anything but `Admin` is a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Authenticated user as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub email_verified: bool,
    pub created_at: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl User {
    /// Whether this account may call the `/admin` endpoints.
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Login / email-verification response.
///
/// Only the access credential appears here; the refresh credential is an
/// HttpOnly cookie set by the server and never exposed to this client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
}

/// Registration receipt: the account exists but is unverified until the
/// emailed code is confirmed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReceipt {
    pub message: String,
    pub email: String,
}

/// Generic `{message}` acknowledgement (password endpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReceipt {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyEmailRequest<'a> {
    pub email: &'a str,
    /// 4-digit code from the verification email
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

/// Snake_case on the wire, matching the backend's reset endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
    pub new_password: &'a str,
}

/// Row in the admin user table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub email_verified: bool,
    #[serde(default)]
    pub role: Option<Role>,
    pub created_at: String,
}

/// One day of signups for the admin dashboard chart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignupPoint {
    pub date: String,
    pub count: u64,
}
