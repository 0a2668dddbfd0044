//! Bearer-token verification for the REST API.
//!
//! Tokens are HS256-signed JWTs issued by the account service; this backend
//! only verifies them. Handlers take an [`AuthUser`] argument and axum runs
//! the extraction, so an unauthenticated request never reaches handler code.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::MessageResponse;

use crate::rest::AppState;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's internal database id
    pub id: i64,
    pub username: String,
    /// Role name, `"admin"` or `"user"`
    pub role: String,
    /// Expiration time (UTC Unix timestamp)
    pub exp: i64,
}

/// Validate and decode an access token, returning the embedded [`Claims`].
/// Signature and expiration are checked; anything else is the caller's
/// problem.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<MessageResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Authentication required"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Authentication required"))?;

        let claims = verify_token(token, &state.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            unauthorized("Invalid or expired token")
        })?;

        Ok(claims.into())
    }
}
