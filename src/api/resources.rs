//! Typed wrappers over the booking platform endpoints

use super::models::{AdminBooking, Booking, DashboardStats, Event, NewEvent, User};
use crate::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{Error, Result};
use crate::http::{ApiClient, RequestConfig};
use crate::session::SessionContext;
use crate::types::JsonValue;
use reqwest::{Method, Response};
use tracing::{info, warn};

/// Event booking API
#[derive(Debug, Clone)]
pub struct EventDeskApi {
    client: ApiClient,
}

impl EventDeskApi {
    /// Wrap an authenticated client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client, for endpoints without a wrapper
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The session shared with the client
    pub fn session(&self) -> &SessionContext {
        self.client.session()
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Exchange credentials for tokens and persist them
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let login: LoginResponse = self
            .client
            .request_json(Method::POST, "login/", RequestConfig::new().json(body))
            .await?;

        self.session()
            .store_login(&login.access, &login.refresh, login.user.as_ref())
            .await?;
        info!(username, "Logged in");
        Ok(login)
    }

    /// Create an account; the caller logs in separately
    pub async fn register(&self, request: &RegisterRequest) -> Result<JsonValue> {
        let body = serde_json::to_value(request)?;
        let response = self.client.post("register/", body).await?;
        json_or_null(response).await
    }

    /// End the session locally
    pub async fn logout(&self) {
        self.session().teardown().await;
    }

    /// Current user profile
    pub async fn me(&self) -> Result<User> {
        self.client.get_json("me/").await
    }

    /// Confirm the stored session is still accepted by the server
    ///
    /// With no access token this returns `false` without a network call.
    /// Any failure of `me/` clears the stored credentials.
    pub async fn verify_session(&self) -> Result<bool> {
        if self.session().access_token().await?.is_none() {
            return Ok(false);
        }

        match self.me().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Session rejected, clearing credentials");
                if let Err(clear_err) = self.session().store().clear().await {
                    warn!(error = %clear_err, "Failed to clear session storage");
                }
                Ok(false)
            }
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// All events
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.client.get_json("events/").await
    }

    /// Create an event (admin)
    pub async fn create_event(&self, event: &NewEvent) -> Result<JsonValue> {
        let response = self
            .client
            .post("events/create/", serde_json::to_value(event)?)
            .await?;
        json_or_null(response).await
    }

    /// Replace an event's fields (admin)
    pub async fn update_event(&self, id: i64, event: &NewEvent) -> Result<JsonValue> {
        let response = self
            .client
            .put(&format!("events/{id}/update/"), serde_json::to_value(event)?)
            .await?;
        json_or_null(response).await
    }

    /// Delete an event (admin)
    pub async fn delete_event(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("events/{id}/delete/")).await?;
        Ok(())
    }

    /// Book a seat at an event
    pub async fn book_event(&self, id: i64) -> Result<JsonValue> {
        let response = self
            .client
            .request(Method::POST, &format!("events/{id}/book/"), RequestConfig::new())
            .await?;
        json_or_null(response).await
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Bookings held by the current user
    pub async fn my_bookings(&self) -> Result<Vec<Booking>> {
        self.client.get_json("my-bookings/").await
    }

    /// Cancel one of the current user's bookings
    pub async fn cancel_booking(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("bookings/{id}/cancel/"))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Admin
    // ========================================================================

    /// Aggregate dashboard figures
    pub async fn admin_dashboard(&self) -> Result<DashboardStats> {
        self.client.get_json("admin/dashboard/").await
    }

    /// Every booking on the platform
    pub async fn admin_bookings(&self) -> Result<Vec<AdminBooking>> {
        self.client.get_json("admin/bookings/").await
    }
}

/// Parse a JSON body, treating an empty body as `null`
async fn json_or_null(response: Response) -> Result<JsonValue> {
    let text = response.text().await.map_err(Error::Http)?;
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
