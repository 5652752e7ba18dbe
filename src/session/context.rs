//! Session context shared by the API client and resource wrappers

use super::navigator::{LogNavigator, Navigator};
use super::store::{MemoryStore, TokenStore};
use crate::config::DEFAULT_ENTRY_ROUTE;
use crate::error::{Error, Result};
use crate::types::{JsonValue, ACCESS_KEY, REFRESH_KEY, USER_KEY};
use std::sync::Arc;
use tracing::{debug, warn};

/// Explicit session state: token storage plus the teardown hook
///
/// Clone is cheap; clones share the same store and navigator.
#[derive(Debug, Clone)]
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    entry_route: String,
}

impl SessionContext {
    /// Create a session over the given store, logging redirects
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            navigator: Arc::new(LogNavigator),
            entry_route: DEFAULT_ENTRY_ROUTE.to_string(),
        }
    }

    /// Create a session backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the navigator
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Replace the route used on teardown
    #[must_use]
    pub fn with_entry_route(mut self, route: impl Into<String>) -> Self {
        self.entry_route = route.into();
        self
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Route used on teardown
    pub fn entry_route(&self) -> &str {
        &self.entry_route
    }

    /// Stored access token, if any
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(ACCESS_KEY).await?.filter(|t| !t.is_empty()))
    }

    /// Stored refresh token, if any
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(REFRESH_KEY).await?.filter(|t| !t.is_empty()))
    }

    /// Stored user profile, if any
    pub async fn user(&self) -> Result<Option<JsonValue>> {
        match self.store.get(USER_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Replace the access token in place
    pub async fn set_access_token(&self, token: &str) -> Result<()> {
        self.store.set(ACCESS_KEY, token).await
    }

    /// Replace the refresh token in place
    pub async fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.store.set(REFRESH_KEY, token).await
    }

    /// Persist the credentials returned by a login exchange
    pub async fn store_login(
        &self,
        access: &str,
        refresh: &str,
        user: Option<&JsonValue>,
    ) -> Result<()> {
        if access.is_empty() {
            return Err(Error::auth("Login response did not include an access token"));
        }
        self.store.set(ACCESS_KEY, access).await?;
        self.store.set(REFRESH_KEY, refresh).await?;
        match user {
            Some(user) => {
                let raw = serde_json::to_string(user)?;
                self.store.set(USER_KEY, &raw).await?;
            }
            None => self.store.remove(USER_KEY).await?,
        }
        debug!("Stored session credentials");
        Ok(())
    }

    /// Whether an access token is currently stored
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.access_token().await, Ok(Some(_)))
    }

    /// Clear every stored credential and return to the entry route
    ///
    /// Never fails: storage errors are logged and the redirect still happens.
    pub async fn teardown(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear session storage during teardown");
        }
        self.navigator.navigate(&self.entry_route);
    }
}
