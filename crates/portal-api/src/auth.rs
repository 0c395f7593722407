//! Authentication operations
//!
//! Login and email verification install the returned access credential
//! into the client; logout is best effort against the server but always
//! clears local state. Everything else is a plain typed call.

use portal_client::{ApiClient, Result};
use tracing::warn;

use crate::types::{
    AuthTokens, LoginRequest, RegisterReceipt, RegisterRequest, User, VerifyEmailRequest,
};

/// Authenticate with email and password.
///
/// On success the access credential is installed and the server has set
/// the refresh cookie on the transport's cookie store.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<AuthTokens> {
    let tokens: AuthTokens = client
        .post("/auth/login", &LoginRequest { email, password })
        .await?;
    client.install_token(tokens.access_token.clone());
    Ok(tokens)
}

/// Create an account. No credential is issued yet: the caller must
/// confirm the emailed verification code first.
pub async fn register(client: &ApiClient, email: &str, password: &str) -> Result<RegisterReceipt> {
    client
        .post("/auth/register", &RegisterRequest { email, password })
        .await
}

/// Confirm the 4-digit verification code. On success the account is
/// active and the returned credential is installed.
pub async fn verify_email(client: &ApiClient, email: &str, code: &str) -> Result<AuthTokens> {
    let tokens: AuthTokens = client
        .post("/auth/verify-email", &VerifyEmailRequest { email, code })
        .await?;
    client.install_token(tokens.access_token.clone());
    Ok(tokens)
}

/// Fetch the authenticated user.
pub async fn current_user(client: &ApiClient) -> Result<User> {
    client.get("/auth/me").await
}

/// Refresh the access credential explicitly.
///
/// Routed through the same single-flight path the 401 protocol uses, so
/// a manual refresh never races an automatic one.
pub async fn refresh_session(client: &ApiClient) -> Result<()> {
    client.refresh_credential().await
}

/// End the session.
///
/// The server call is best effort: its failure is logged and absorbed,
/// and the local credential is cleared no matter what. This is the one
/// place the pipeline's errors are deliberately swallowed.
pub async fn logout(client: &ApiClient) {
    if let Err(err) = client.post_empty::<serde_json::Value>("/auth/logout").await {
        warn!(error = %err, "logout call failed, clearing local session anyway");
    }
    client.clear_token();
}
