//! HTTP client module
//!
//! Provides the authenticated API client.
//!
//! # Features
//!
//! - **Bearer Injection**: The stored access token rides on every request
//! - **Transparent Refresh**: A `401` triggers one refresh-and-retry
//! - **Session Teardown**: A failed refresh clears the session
//! - **Error Passthrough**: Other statuses and transport errors reach the caller unchanged

mod client;

pub use client::{ApiClient, PendingRequest, RequestConfig, MAX_AUTH_RETRIES};

#[cfg(test)]
mod tests;
