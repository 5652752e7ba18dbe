//! Authentication module
//!
//! Bearer token supply and the refresh-token exchange.
//!
//! The `Authenticator` reads the access token from the session for every
//! request and, when the API answers `401`, trades the stored refresh token
//! for a new access token. Concurrent recoveries are coalesced so a burst of
//! rejected requests costs a single refresh call.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, TokenRefresher};
pub use types::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, TokenClaims};
