// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client.
//!
//! Handles:
//! - Account creation and e-mail confirmation resends
//! - Password sign-in and magic-link (one-time link) sign-in with PKCE
//! - Session refresh, revocation and user lookup

use crate::error::AppError;
use crate::models::{Account, Session};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a sign-up: the account, and a session when no confirmation is needed.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: Option<Account>,
    pub session: Option<Session>,
}

/// Operations offered by the hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. `redirect_to` is where the confirmation link lands.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResult, AppError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AppError>;

    /// E-mail a one-time sign-in link bound to a PKCE challenge.
    async fn sign_in_with_otp(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AppError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    async fn get_user(&self, access_token: &str) -> Result<Account, AppError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError>;

    /// Trade the code from a magic link or confirmation link for a session.
    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, AppError>;

    async fn resend_signup_confirmation(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// GoTrueClient - REST client for the hosted identity provider
// ─────────────────────────────────────────────────────────────────────────────

/// Identity provider REST client (`{backend_url}/auth/v1`).
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Account,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            chrono::Utc::now().timestamp() + self.expires_in.unwrap_or(3600)
        });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user,
        }
    }
}

/// Error body shapes used by the identity provider.
#[derive(Deserialize)]
struct ProviderError {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
    }
}

impl GoTrueClient {
    /// Create a client for `{backend_url}/auth/v1`.
    pub fn new(backend_url: &str, anon_key: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::IdentityUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        let base_url = format!("{}/auth/v1", backend_url.trim_end_matches('/'));
        tracing::info!(url = %base_url, "Identity provider client initialized");

        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    /// POST to the token endpoint with a grant type.
    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, AppError> {
        let response = self
            .post("/token")
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        let token: TokenResponse = check_response_json(response).await?;
        Ok(token.into_session())
    }
}

/// Check response status and map provider errors to their message.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderError>(&body)
        .ok()
        .and_then(ProviderError::into_message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status.is_server_error() {
        return Err(AppError::IdentityUnavailable(format!(
            "HTTP {}: {}",
            status, message
        )));
    }

    Err(AppError::Identity(message))
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| AppError::IdentityUnavailable(format!("JSON parse error: {}", e)))
}

/// Interpret a sign-up body: a full session when auto-confirmed, otherwise the
/// bare user (top-level or under `user`).
fn parse_sign_up(body: serde_json::Value) -> Result<SignUpResult, AppError> {
    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AppError::IdentityUnavailable(format!("JSON parse error: {}", e)))?;
        let session = token.into_session();
        return Ok(SignUpResult {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user_value = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    let user = serde_json::from_value::<Account>(user_value).ok();
    Ok(SignUpResult {
        user,
        session: None,
    })
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResult, AppError> {
        let response = self
            .post("/signup")
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        let body: serde_json::Value = check_response_json(response).await?;
        parse_sign_up(body)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_in_with_otp(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AppError> {
        let response = self
            .post("/otp")
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({
                "email": email,
                "create_user": false,
                "code_challenge": code_challenge,
                "code_challenge_method": "s256",
            }))
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        check_response(response).await?;
        tracing::info!("Magic link requested");
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .post("/logout")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Account, AppError> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        check_response_json(response).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, AppError> {
        self.token_grant(
            "pkce",
            serde_json::json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn resend_signup_confirmation(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError> {
        let response = self
            .post("/resend")
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "type": "signup", "email": email }))
            .send()
            .await
            .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }
}
