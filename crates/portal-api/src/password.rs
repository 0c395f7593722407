//! Password recovery operations

use portal_client::{ApiClient, Result};

use crate::types::{ForgotPasswordRequest, MessageReceipt, ResetPasswordRequest};

/// Request a password reset email. Succeeds with a generic message
/// whether or not the address exists; the server never discloses which.
pub async fn forgot_password(client: &ApiClient, email: &str) -> Result<MessageReceipt> {
    client
        .post("/auth/forgot-password", &ForgotPasswordRequest { email })
        .await
}

/// Redeem a reset token for a new password.
pub async fn reset_password(
    client: &ApiClient,
    email: &str,
    token: &str,
    new_password: &str,
) -> Result<MessageReceipt> {
    client
        .post(
            "/auth/reset-password",
            &ResetPasswordRequest {
                email,
                token,
                new_password,
            },
        )
        .await
}
