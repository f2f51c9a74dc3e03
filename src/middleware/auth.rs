// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session middleware and direct-auth tokens.

use crate::error::AppError;
use crate::middleware::client::ClientContext;
use crate::models::Account;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where anonymous page requests are sent.
pub const SIGN_IN_PATH: &str = "/auth/signin";
/// Where signed-in callers land.
pub const LANDING_PATH: &str = "/dashboard";

/// Claims carried by a direct-auth access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectClaims {
    /// Subject (account id)
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Mint a direct-auth access token expiring at `expires_at`.
pub fn create_direct_token(
    account: &Account,
    expires_at: i64,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = DirectClaims {
        sub: account.id.clone(),
        email: account.email.clone(),
        iat: usize::try_from(now)?,
        exp: usize::try_from(expires_at)?,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Check signature and expiry of a direct-auth access token.
pub fn verify_direct_token(
    token: &str,
    signing_key: &[u8],
) -> Result<DirectClaims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<DirectClaims>(token, &key, &validation).map(|data| data.claims)
}

fn client_context(request: &Request) -> Result<ClientContext, AppError> {
    request
        .extensions()
        .get::<ClientContext>()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("client context missing")))
}

/// Middleware that requires a signed-in caller.
///
/// Inserts [`CurrentUser`](crate::services::CurrentUser) on success. Anonymous
/// API calls get `401`; anonymous page requests are redirected to sign-in.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_context(&request)?;

    match state.bootstrap.resolve(&client.storage).await.user() {
        Some(user) => {
            request.extensions_mut().insert(user.clone());
            Ok(next.run(request).await)
        }
        None if request.uri().path().starts_with("/api/") => Err(AppError::Unauthorized),
        None => Ok(Redirect::to(SIGN_IN_PATH).into_response()),
    }
}

/// Middleware that sends signed-in callers away from the auth pages.
pub async fn redirect_if_authenticated(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_context(&request)?;

    if state.bootstrap.peek_account(&client.storage).await.is_some() {
        return Ok(Redirect::to(LANDING_PATH).into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: "user-1".to_string(),
            email: "demo@chapman.edu".to_string(),
        }
    }

    #[test]
    fn test_direct_token_roundtrip() {
        let key = b"token_key_for_tests";
        let expires_at = chrono::Utc::now().timestamp() + 3600;
        let token = create_direct_token(&account(), expires_at, key).unwrap();

        let claims = verify_direct_token(&token, key).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "demo@chapman.edu");
        assert_eq!(claims.exp as i64, expires_at);
    }

    #[test]
    fn test_direct_token_rejects_wrong_key() {
        let expires_at = chrono::Utc::now().timestamp() + 3600;
        let token = create_direct_token(&account(), expires_at, b"key_one").unwrap();
        assert!(verify_direct_token(&token, b"key_two").is_err());
    }

    #[test]
    fn test_direct_token_rejects_expired() {
        let key = b"token_key_for_tests";
        let expires_at = chrono::Utc::now().timestamp() - 10;
        let token = create_direct_token(&account(), expires_at, key).unwrap();
        assert!(verify_direct_token(&token, key).is_err());
    }
}
