// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-out, auth callback and verification routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::{LANDING_PATH, SIGN_IN_PATH};
use crate::middleware::ClientContext;
use crate::services::{SignInView, VerificationNotice};
use crate::AppState;

/// Auth pages that signed-in callers are redirected away from.
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signin", post(sign_in))
        .route("/auth/verification", get(verification))
        .route("/auth/verification/resend", post(resend_verification))
}

/// Routes that work for any caller.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/callback", get(auth_callback))
        .route("/auth/signout", post(sign_out))
}

// ─── Sign In ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignInRequest {
    email: String,
    #[serde(default)]
    password: String,
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
    Json(body): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SignInView>)> {
    let _guard = state.in_flight.begin(&client.client_id, "sign-in")?;

    let outcome = state
        .sign_in
        .sign_in(&client.storage, &body.email, &body.password)
        .await?;

    let status = outcome.error().map_or(StatusCode::OK, |e| e.status());
    Ok((status, Json(SignInView::from(&outcome))))
}

// ─── Callback ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn sign_in_with_error(message: &str) -> Redirect {
    Redirect::to(&format!(
        "{}?error={}",
        SIGN_IN_PATH,
        urlencoding::encode(message)
    ))
}

/// Landing point for magic links and confirmation e-mails.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    if let Some(error) = params.error {
        let message = params.error_description.unwrap_or(error);
        tracing::warn!(error = %message, "Auth callback carried an error");
        return sign_in_with_error(&message);
    }

    // Confirmation links carry no code; the guarded landing page decides
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::debug!("Auth callback without a code");
        return Redirect::to(LANDING_PATH);
    };

    match state.sign_in.complete_callback(&client.storage, &code).await {
        Ok(_) => Redirect::to(LANDING_PATH),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to exchange auth code");
            sign_in_with_error(&e.user_message())
        }
    }
}

// ─── Sign Out ────────────────────────────────────────────────────

async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
) -> Redirect {
    state.bootstrap.sign_out(&client.storage).await;
    Redirect::to("/")
}

// ─── Verification ────────────────────────────────────────────────

async fn verification(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
) -> Json<VerificationNotice> {
    Json(state.verification.notice(&client.storage))
}

async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
) -> Result<Json<VerificationNotice>> {
    let _guard = state.in_flight.begin(&client.client_id, "resend-verification")?;
    Ok(Json(state.verification.resend(&client.storage).await?))
}
