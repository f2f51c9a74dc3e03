// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multi-step registration routes.
//!
//! The wizard lives in client storage; every call returns the current view
//! so the client can render it directly.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::ClientContext;
use crate::services::signup::{SignupFormPatch, SignupStatus};
use crate::services::{SignupView, SignupWizard};
use crate::storage::{keys, ClientStorage};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", get(current))
        .route("/auth/signup/step", post(next_step))
        .route("/auth/signup/back", post(previous_step))
        .route("/auth/signup/submit", post(submit))
}

type WizardResponse = (StatusCode, Json<SignupView>);

/// Persist the wizard and render it with the status of the last action.
fn respond(
    storage: &ClientStorage,
    wizard: &SignupWizard,
    outcome: std::result::Result<(), AppError>,
) -> Result<WizardResponse> {
    wizard.save(storage)?;
    let status = match outcome {
        Ok(()) => StatusCode::OK,
        Err(AppError::Internal(e)) => return Err(AppError::Internal(e)),
        Err(e) => e.status(),
    };
    Ok((status, Json(SignupView::from(wizard))))
}

async fn current(Extension(client): Extension<ClientContext>) -> Json<SignupView> {
    Json(SignupView::from(&SignupWizard::load(&client.storage)))
}

async fn next_step(
    Extension(client): Extension<ClientContext>,
    Json(patch): Json<SignupFormPatch>,
) -> Result<WizardResponse> {
    let mut wizard = SignupWizard::load(&client.storage);
    wizard.update(patch);
    let outcome = wizard.advance().map(|_| ());
    respond(&client.storage, &wizard, outcome)
}

async fn previous_step(Extension(client): Extension<ClientContext>) -> Result<WizardResponse> {
    let mut wizard = SignupWizard::load(&client.storage);
    let outcome = wizard.back().map(|_| ());
    respond(&client.storage, &wizard, outcome)
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
    Json(patch): Json<SignupFormPatch>,
) -> Result<WizardResponse> {
    let _guard = state.in_flight.begin(&client.client_id, "sign-up")?;

    let mut wizard = SignupWizard::load(&client.storage);
    wizard.update(patch);
    let outcome = state
        .signup
        .submit(&client.storage, &mut wizard)
        .await
        .map(|account| {
            tracing::info!(user_id = %account.id, "Registration completed");
        });

    if matches!(wizard.status, SignupStatus::Completed { .. }) {
        // The completed view is returned once; a later visit starts over
        client.storage.remove_item(keys::SIGNUP_WIZARD);
        return Ok((StatusCode::OK, Json(SignupView::from(&wizard))));
    }
    respond(&client.storage, &wizard, outcome)
}
