// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # EventDesk Client
//!
//! Async Rust client for the EventDesk booking API.
//!
//! ## Features
//!
//! - **Bearer Authentication**: The stored access token rides on every request
//! - **Transparent Refresh**: An expired access token is refreshed once and the request replayed
//! - **Session Teardown**: A dead refresh token clears the session and returns to the entry route
//! - **Pluggable Storage**: In-memory or JSON-file token stores behind one trait
//! - **Typed Resources**: Events, bookings and the admin dashboard
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eventdesk_client::{ApiClient, ClientConfig, EventDeskApi, Result, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::new(ClientConfig::from_env()?, SessionContext::in_memory())?;
//!     let api = EventDeskApi::new(client);
//!
//!     api.login("alice", "secret").await?;
//!     for event in api.list_events().await? {
//!         println!("{} @ {}", event.title, event.location);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  EventDeskApi (resources)                 │
//! │  login · me · events · bookings · admin dashboard         │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────────────────────────────────────────────────────┐
//! │                 ApiClient (bearer + 401 retry)            │
//! └───────────────────────────────────────────────────────────┘
//!               │                               │
//! ┌─────────────────────────────┐ ┌───────────────────────────┐
//! │ Authenticator               │ │ SessionContext            │
//! │ refresh · coalescing lock   │ │ TokenStore · Navigator    │
//! └─────────────────────────────┘ └───────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Token storage and session lifecycle
pub mod session;

/// Token refresh and claims
pub mod auth;

/// Authenticated HTTP client
pub mod http;

/// Typed resource endpoints
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use api::EventDeskApi;
pub use config::ClientConfig;
pub use http::ApiClient;
pub use session::SessionContext;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
