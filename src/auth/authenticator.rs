//! Authenticator implementation
//!
//! Supplies the bearer token for outbound requests and runs the
//! refresh-token exchange when the API rejects an access token.

use super::types::{RefreshRequest, RefreshResponse};
use crate::error::{Error, Result};
use crate::session::SessionContext;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Exchanges a refresh token for a new access token
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    refresh_url: String,
    http_client: Client,
}

impl TokenRefresher {
    /// Create a refresher for the given endpoint
    pub fn new(refresh_url: impl Into<String>) -> Self {
        Self::with_client(refresh_url, Client::new())
    }

    /// Create a refresher with a custom HTTP client
    pub fn with_client(refresh_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            refresh_url: refresh_url.into(),
            http_client,
        }
    }

    /// Refresh endpoint URL
    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    /// Run the exchange; the call itself carries no `Authorization` header
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let response = self
            .http_client
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(Some(status), body));
        }

        let token_response: RefreshResponse = response.json().await.map_err(Error::Http)?;
        if token_response.access.is_empty() {
            return Err(Error::token_refresh(
                None,
                "Refresh response did not include an access token",
            ));
        }

        Ok(token_response)
    }
}

/// Authenticator binds the session to the refresh exchange
#[derive(Debug, Clone)]
pub struct Authenticator {
    session: SessionContext,
    refresher: TokenRefresher,
    /// Held for the duration of a refresh when coalescing
    refresh_lock: Arc<Mutex<()>>,
    coalesce: bool,
}

impl Authenticator {
    /// Create an authenticator with refresh coalescing enabled
    pub fn new(session: SessionContext, refresher: TokenRefresher) -> Self {
        Self {
            session,
            refresher,
            refresh_lock: Arc::new(Mutex::new(())),
            coalesce: true,
        }
    }

    /// Enable or disable refresh coalescing
    #[must_use]
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    /// The session this authenticator reads and writes
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The refresh exchange
    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// Token to attach to the next outbound request
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.session.access_token().await
    }

    /// Recover from a `401` received while sending `stale` (or no token)
    ///
    /// Returns `Ok(Some(token))` with the token to retry with, or `Ok(None)`
    /// when no refresh token is stored or the session was already ended by a
    /// concurrent recovery. Every path other than `Ok(Some(_))` leaves the
    /// session torn down, and teardown runs once per ended session.
    pub async fn recover(&self, stale: Option<&str>) -> Result<Option<String>> {
        if !self.coalesce {
            return self.refresh_and_store().await;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed or ended the session while we waited
        match self.session.access_token().await? {
            Some(current) if stale != Some(current.as_str()) => {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(Some(current));
            }
            None if stale.is_some() => {
                debug!("Session already ended by a concurrent request");
                return Ok(None);
            }
            _ => {}
        }

        self.refresh_and_store().await
    }

    async fn refresh_and_store(&self) -> Result<Option<String>> {
        let refresh_token = match self.session.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("No refresh token stored, ending session");
                self.session.teardown().await;
                return Ok(None);
            }
            Err(e) => {
                self.session.teardown().await;
                return Err(e);
            }
        };

        debug!(url = %self.refresher.refresh_url(), "Refreshing access token");
        let response = match self.refresher.refresh(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.session.teardown().await;
                return Err(e);
            }
        };

        self.session.set_access_token(&response.access).await?;
        if let Some(rotated) = response.refresh.as_deref().filter(|t| !t.is_empty()) {
            self.session.set_refresh_token(rotated).await?;
        }

        info!("Access token refreshed");
        Ok(Some(response.access))
    }
}
