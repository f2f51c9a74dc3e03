// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod api;
pub mod auth;
pub mod events;
pub mod signup;

use crate::middleware::{client_context, redirect_if_authenticated, require_session, ClientContext};
use crate::services::SessionSource;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    pub university: String,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SessionSource>,
}

/// Public landing page: tells the client whether it is signed in.
async fn landing(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
) -> Json<LandingResponse> {
    let current = state.bootstrap.peek_account(&client.storage).await;
    Json(LandingResponse {
        university: state.config.university.clone(),
        authenticated: current.is_some(),
        source: current.map(|(_, source)| source),
    })
}

/// Whether an origin is a local dev server (`http://localhost[:port]` or
/// `http://127.0.0.1[:port]`). The host must match exactly.
fn is_local_dev_origin(origin: &str) -> bool {
    let Some(authority) = origin.strip_prefix("http://") else {
        return false;
    };
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };
    matches!(host, "localhost" | "127.0.0.1")
        && port.map_or(true, |p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url || is_local_dev_origin(origin_str)
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Public routes (any caller)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/", get(landing))
        .merge(auth::routes());

    // Sign-in and sign-up pages (signed-in callers go to the dashboard)
    let auth_pages = auth::page_routes()
        .merge(signup::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            redirect_if_authenticated,
        ));

    // Protected routes (session required)
    let protected_routes = api::routes()
        .merge(events::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(auth_pages)
        .merge(protected_routes)
        // Runs before the session layers so they can see ClientContext
        .layer(middleware::from_fn_with_state(state.clone(), client_context))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
