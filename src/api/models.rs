//! Resource models
//!
//! Field sets follow what the API returns today; anything optional on the
//! wire is optional here so older servers still deserialize.

use serde::{Deserialize, Serialize};

/// Authenticated user profile (`GET me/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Event as listed by `GET events/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// Date as sent by the server (ISO 8601)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Seats left; `Some(0)` means the event is full
    #[serde(default)]
    pub available_slots: Option<u32>,
}

impl Event {
    /// Whether no seats are left
    pub fn is_full(&self) -> bool {
        self.available_slots == Some(0)
    }
}

/// Payload for creating or updating an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub capacity: u32,
}

/// A booking belonging to the current user (`GET my-bookings/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub booked_at: Option<String>,
}

/// A booking as seen by an administrator (`GET admin/bookings/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBooking {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub booked_at: Option<String>,
}

/// Recent activity entry on the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentBooking {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub booked_at: Option<String>,
}

/// Aggregate figures for `GET admin/dashboard/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_bookings: u64,
    #[serde(default)]
    pub new_users_this_month: Option<u64>,
    #[serde(default)]
    pub active_events: Option<u64>,
    #[serde(default)]
    pub bookings_today: Option<u64>,
    #[serde(default)]
    pub upcoming_events: Option<u64>,
    #[serde(default)]
    pub active_users: Option<u64>,
    #[serde(default)]
    pub total_capacity: Option<u64>,
    #[serde(default)]
    pub recent_bookings: Vec<RecentBooking>,
    #[serde(default)]
    pub top_events: Vec<serde_json::Value>,
}

impl DashboardStats {
    /// Average bookings per event, zero when there are no events
    pub fn bookings_per_event(&self) -> f64 {
        if self.total_events == 0 {
            0.0
        } else {
            self.total_bookings as f64 / self.total_events as f64
        }
    }
}
