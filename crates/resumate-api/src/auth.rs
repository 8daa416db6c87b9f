//! Bearer token authentication.
//!
//! Tokens are ES256 JWTs issued by Stack Auth. The JWKS is fetched once per
//! process and reused for every request.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// The only identity handlers ever see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: Option<&str>) -> ApiResult<AuthUser>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies ES256 tokens against a remote JWKS, audience = project id
pub struct JwksVerifier {
    jwks_url: String,
    audience: String,
    http: reqwest::Client,
    keys: OnceCell<JwkSet>,
}

impl JwksVerifier {
    pub fn new(jwks_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            audience: audience.into(),
            http: reqwest::Client::new(),
            keys: OnceCell::new(),
        }
    }

    async fn key_set(&self) -> ApiResult<&JwkSet> {
        self.keys
            .get_or_try_init(|| async {
                tracing::info!(url = %self.jwks_url, "fetching JWKS");
                let response = self
                    .http
                    .get(&self.jwks_url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ApiError::Config(format!("Failed to fetch JWKS: {}", e)))?;

                response
                    .json::<JwkSet>()
                    .await
                    .map_err(|e| ApiError::Config(format!("Invalid JWKS: {}", e)))
            })
            .await
    }

    /// Key matching the token's `kid`, else the first key of the set
    fn decoding_key(keys: &JwkSet, kid: Option<&str>) -> ApiResult<DecodingKey> {
        let jwk = kid
            .and_then(|kid| keys.find(kid))
            .or_else(|| keys.keys.first())
            .ok_or_else(|| ApiError::Config("JWKS has no keys".to_string()))?;

        DecodingKey::from_jwk(jwk).map_err(|e| ApiError::Config(format!("Unusable JWK: {}", e)))
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: Option<&str>) -> ApiResult<AuthUser> {
        let token = token.ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let header = decode_header(token).map_err(invalid_token)?;
        let key = Self::decoding_key(self.key_set().await?, header.kid.as_deref())?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &key, &validation).map_err(invalid_token)?;

        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

fn invalid_token(e: jsonwebtoken::errors::Error) -> ApiError {
    ApiError::Unauthorized(format!("Invalid token: {}", e))
}

/// Local development: no verification. The bearer value, if any, is taken as
/// the user id.
pub struct DisabledAuth;

#[async_trait]
impl TokenVerifier for DisabledAuth {
    async fn verify(&self, token: Option<&str>) -> ApiResult<AuthUser> {
        Ok(AuthUser {
            id: token.unwrap_or("anonymous").to_string(),
            email: None,
        })
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let user = state.auth.verify(bearer_token(&parts.headers)).await?;
        tracing::debug!(user_id = %user.id, "authenticated request");
        Ok(user)
    }
}
