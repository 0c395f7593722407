//! The authenticated-request pipeline
//!
//! One logical call through [`ApiClient`]: read the held credential,
//! attach it, send with a wall-clock timeout, and on 401 run the refresh
//! protocol. At most one retry, never a loop.
//!
//! Per-call state machine (terminal states in caps):
//! - attempt 1, no credential held → 401 ⇒ UNAUTHORIZED (nothing to
//!   refresh), anything else ⇒ decoded/classified as-is.
//! - attempt 1, credential held → 401:
//!   - not locally expired ⇒ the server rejected a credential that looks
//!     valid here (revoked/invalid); clear it, UNAUTHORIZED. No refresh.
//!   - locally expired ⇒ single-flight refresh; failure ⇒ SESSION
//!     EXPIRED, success ⇒ attempt 2.
//! - attempt 2 → sent exactly once with the fresh credential; a second
//!   401 clears the credential and is UNAUTHORIZED, everything else is
//!   decoded/classified verbatim. Never a third attempt.
//!
//! Timeouts and transport failures are terminal at either attempt and
//! never trigger a refresh.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{self, Error, Result};
use crate::refresh::RefreshCoordinator;
use crate::token::{AccessToken, TokenHolder};

/// HTTP client that owns the credential lifecycle for the portal API.
///
/// Cheap to share behind an `Arc`; all mutable state lives in the token
/// holder and the refresh coordinator's rendezvous slot.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<TokenHolder>,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    /// Build a client from a validated configuration.
    ///
    /// The underlying transport keeps a cookie store: the server-managed
    /// refresh cookie must ride along on every request, bearer or not.
    pub fn new(config: ClientConfig) -> common::Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| common::Error::Config(format!("building http transport: {e}")))?;

        let tokens = Arc::new(TokenHolder::new());
        let refresher = RefreshCoordinator::new(http.clone(), &config, Arc::clone(&tokens));

        Ok(Self {
            http,
            config,
            tokens,
            refresher,
        })
    }

    /// Read-only view of the credential slot.
    pub fn tokens(&self) -> &TokenHolder {
        &self.tokens
    }

    /// Install a credential returned by login or email verification.
    ///
    /// This and [`clear_token`](Self::clear_token) are the only write
    /// paths into the holder outside the pipeline itself.
    pub fn install_token(&self, raw: impl Into<String>) {
        self.tokens.set(Some(AccessToken::new(raw)));
    }

    /// Drop the held credential (local logout).
    pub fn clear_token(&self) {
        self.tokens.set(None);
    }

    /// Refresh the credential explicitly, through the same single-flight
    /// path the 401 protocol uses.
    pub async fn refresh_credential(&self) -> Result<()> {
        match tokio::time::timeout(self.config.timeout, self.refresher.refresh()).await {
            Err(_) => Err(self.timeout_error()),
            Ok(Err(err)) => Err(Error::SessionExpired(err.to_string())),
            Ok(Ok(_)) => Ok(()),
        }
    }

    /// GET `path`, decoding the response body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    /// POST `body` as JSON to `path`.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST with an empty body (logout, refresh-style endpoints).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::POST, path, None).await
    }

    /// PUT `body` as JSON to `path`.
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// PATCH `body` as JSON to `path`.
    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE `path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, path, None).await
    }

    /// One logical request through the full pipeline.
    pub async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.config.url_for(path);
        let held = self.tokens.get();

        let response = self.attempt(&method, &url, body, held.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        let Some(held) = held else {
            debug!(%url, "401 without a credential, nothing to refresh");
            return Err(Error::Unauthorized);
        };

        if !held.is_expired(self.config.expiry_leeway) {
            // The server refused a credential that has not reached its
            // decoded expiry: revoked or invalid, not transient.
            warn!(%url, "locally valid credential rejected, clearing");
            self.tokens.set(None);
            return Err(Error::Unauthorized);
        }

        debug!(%url, "401 with expired credential, refreshing");
        let fresh = match tokio::time::timeout(self.config.timeout, self.refresher.refresh()).await
        {
            Err(_) => return Err(self.timeout_error()),
            Ok(Err(err)) => return Err(Error::SessionExpired(err.to_string())),
            Ok(Ok(token)) => token,
        };

        // The one permitted retry. Whatever comes back is terminal.
        let response = self.attempt(&method, &url, body, Some(&fresh)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%url, "fresh credential rejected on retry");
            self.tokens.set(None);
            return Err(Error::Unauthorized);
        }
        decode(response).await
    }

    /// Send one HTTP attempt: attach the bearer if held, bound it by the
    /// configured timeout, and map transport-level failures.
    async fn attempt<B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .timeout(self.config.timeout);

        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token.bearer());
        }

        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() => Err(self.timeout_error()),
            Err(e) => Err(Error::Transport(e.to_string())),
        }
    }

    fn timeout_error(&self) -> Error {
        Error::Timeout(self.config.timeout.as_secs())
    }
}

/// Decode a terminal response: success bodies into `T`, everything else
/// through the error classifier.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;

    if status.is_success() {
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Transport(format!("decoding response body: {e}")))
    } else {
        Err(error::classify_response(status, &bytes))
    }
}
