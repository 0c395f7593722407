//! Single-flight token refresh
//!
//! At most one network call to the refresh endpoint is in flight at any
//! instant. A caller that needs a refresh while one is pending joins it
//! and awaits the same outcome instead of issuing its own call, so N
//! concurrent 401s converge on one refresh. Without the rendezvous, each
//! caller's refresh could rotate the server-side session out from under
//! the others mid-flight.
//!
//! The refresh runs as a spawned task. The task, not its awaiters, owns
//! resolution: it clears the pending slot and publishes the credential
//! change before the outcome becomes observable, and it runs to
//! completion even if every awaiter gives up waiting.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::token::{AccessToken, TokenHolder};

/// Refresh failure. Cloneable so every awaiter of a shared refresh
/// receives the identical value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub(crate) struct RefreshError(pub(crate) String);

/// Outcome every awaiter of one refresh converges on.
pub(crate) type RefreshOutcome = std::result::Result<AccessToken, RefreshError>;

type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Payload returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Coordinates refresh calls so that concurrent callers share one
/// network operation and one outcome.
pub(crate) struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    timeout: Duration,
    tokens: Arc<TokenHolder>,
    /// The rendezvous slot. Occupied exactly while a refresh is in
    /// flight; the refresh task itself empties it on completion.
    pending: Arc<Mutex<Option<PendingRefresh>>>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        http: reqwest::Client,
        config: &ClientConfig,
        tokens: Arc<TokenHolder>,
    ) -> Self {
        Self {
            http,
            refresh_url: config.url_for("/auth/refresh"),
            timeout: config.timeout,
            tokens,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Await a refreshed credential, joining the in-flight refresh if one
    /// exists.
    ///
    /// On success the holder has already been updated with the new
    /// credential; on failure it has already been cleared. Both happen in
    /// the refresh task before any awaiter resumes.
    pub(crate) async fn refresh(&self) -> RefreshOutcome {
        let shared = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.as_ref() {
                Some(inflight) => {
                    debug!("joining in-flight token refresh");
                    inflight.clone()
                }
                None => {
                    let started = self.start_refresh();
                    *pending = Some(started.clone());
                    started
                }
            }
        };
        shared.await
    }

    /// Spawn the refresh task and wrap its handle for sharing.
    ///
    /// Resolution order inside the task matters: the pending slot is
    /// cleared first, then the holder is updated, then the outcome
    /// resolves, so no awaiter can observe a resolved outcome while the
    /// slot still points at it and start a duplicate refresh.
    fn start_refresh(&self) -> PendingRefresh {
        debug!(url = %self.refresh_url, "starting token refresh");

        let http = self.http.clone();
        let url = self.refresh_url.clone();
        let timeout = self.timeout;
        let tokens = Arc::clone(&self.tokens);
        let pending = Arc::clone(&self.pending);

        let task = tokio::spawn(async move {
            let outcome = request_refresh(&http, &url, timeout).await;

            pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match &outcome {
                Ok(token) => {
                    info!("token refresh succeeded");
                    tokens.set(Some(token.clone()));
                }
                Err(err) => {
                    warn!(error = %err, "token refresh failed, clearing credential");
                    tokens.set(None);
                }
            }
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                // Task panics/aborts only on runtime teardown; surface as
                // a refresh failure rather than poisoning the awaiters.
                Err(err) => Err(RefreshError(format!("refresh task aborted: {err}"))),
            }
        }
        .boxed()
        .shared()
    }
}

/// One network call to the refresh endpoint.
///
/// The body is empty; the transport's cookie store carries the
/// server-managed session cookie. The timeout bounds the call so a hung
/// endpoint resolves as a hard failure instead of pinning the slot
/// forever.
async fn request_refresh(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> RefreshOutcome {
    let response = http
        .post(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| RefreshError(format!("refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(RefreshError(format!(
            "refresh endpoint returned {status}: {body}"
        )));
    }

    let payload: RefreshResponse = response
        .json()
        .await
        .map_err(|e| RefreshError(format!("invalid refresh response: {e}")))?;

    Ok(AccessToken::new(payload.access_token))
}
