//! Auth payload types
//!
//! Request and response bodies for the login, registration and refresh
//! endpoints, plus unverified JWT claim inspection.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Body of `POST login/`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login exchange
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<JsonValue>,
}

/// Body of `POST register/`
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body of `POST token/refresh/`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh exchange result
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// Newly issued access token
    #[serde(default)]
    pub access: String,
    /// Rotated refresh token, when the server rotates on use
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Claims carried by an access or refresh token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub user_id: Option<JsonValue>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenClaims {
    /// Read the claims of a JWT without verifying its signature
    ///
    /// Display only. The server remains the authority on token validity.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| Error::InvalidToken {
            message: e.to_string(),
        })?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        // signature checking is off, so the key is never consulted
        let key = DecodingKey::from_secret(&[]);

        decode::<Self>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidToken {
                message: e.to_string(),
            })
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| at <= Utc::now())
    }
}
