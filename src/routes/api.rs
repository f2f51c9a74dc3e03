// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in API: current user, own profile, dashboard and founder directory.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Account, Event, Profile};
use crate::services::{CurrentUser, FounderQuery, ProfileForm, SessionSource};
use crate::time_utils::is_upcoming;
use crate::AppState;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upcoming events shown on the dashboard.
const DASHBOARD_EVENT_LIMIT: usize = 3;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/api/me", get(get_me))
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/founders", get(list_founders))
}

// ─── Current User ────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub account: Account,
    pub profile: Profile,
    pub source: SessionSource,
    /// True when the stored profile could not be created yet
    pub profile_pending: bool,
}

async fn get_me(Extension(user): Extension<CurrentUser>) -> Json<MeResponse> {
    let profile_pending = user.profile.is_placeholder();
    Json(MeResponse {
        account: user.account,
        profile: user.profile,
        source: user.source,
        profile_pending,
    })
}

// ─── Profile ─────────────────────────────────────────────────────

async fn get_profile(Extension(user): Extension<CurrentUser>) -> Json<Profile> {
    Json(user.profile)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileUpdateResponse {
    pub profile: Profile,
    pub message: String,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileUpdateResponse>> {
    let profile = state.profiles.update_profile(&user.account, form).await?;
    Ok(Json(ProfileUpdateResponse {
        profile,
        message: "Profile updated successfully!".to_string(),
    }))
}

// ─── Dashboard ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub account: Account,
    pub profile: Profile,
    pub upcoming_events: Vec<Event>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Json<DashboardResponse> {
    let university = user.profile.university.clone();
    let now = chrono::Utc::now();

    let upcoming_events = match state.db.list_events(Some(&university)).await {
        Ok(events) => events
            .into_iter()
            .filter(|e| is_upcoming(&e.start_date, now))
            .take(DASHBOARD_EVENT_LIMIT)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load dashboard events");
            Vec::new()
        }
    };

    Json(DashboardResponse {
        account: user.account,
        profile: user.profile,
        upcoming_events,
    })
}

// ─── Founders ────────────────────────────────────────────────────

async fn list_founders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FounderQuery>,
) -> Json<Vec<Profile>> {
    Json(state.founders.list(&query).await)
}
