// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus event routes.
//!
//! Anyone signed in may list, read and create events; only the creator may
//! change or delete one.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Event, EventUpdate, NewEvent};
use crate::services::CurrentUser;
use crate::time_utils::{is_upcoming, parse_event_date};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

// ─── Listing ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct EventListParams {
    #[serde(default)]
    university: Option<String>,
    /// Only events that have not started yet
    #[serde(default)]
    upcoming: bool,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventListParams>,
) -> Json<Vec<Event>> {
    let university = params.university.as_deref().filter(|u| !u.is_empty());
    let events = match state.db.list_events(university).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list events");
            return Json(Vec::new());
        }
    };

    if !params.upcoming {
        return Json(events);
    }
    let now = chrono::Utc::now();
    Json(
        events
            .into_iter()
            .filter(|e| is_upcoming(&e.start_date, now))
            .collect(),
    )
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>> {
    let event = state
        .db
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", event_id)))?;
    Ok(Json(event))
}

// ─── Create ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct EventForm {
    #[validate(length(min = 1, message = "Title is required"))]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: serde_json::Value,
    #[validate(length(min = 1, message = "Category is required"))]
    category: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    /// Defaults to the configured university
    #[serde(default)]
    university: Option<String>,
}

fn check_dates(start_date: Option<&str>, end_date: Option<&str>) -> Result<()> {
    let start = match start_date {
        Some(value) => Some(
            parse_event_date(value)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid start date: {}", value)))?,
        ),
        None => None,
    };
    if let Some(value) = end_date {
        let end = parse_event_date(value)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid end date: {}", value)))?;
        if start.is_some_and(|start| end < start) {
            return Err(AppError::BadRequest(
                "Event cannot end before it starts".to_string(),
            ));
        }
    }
    Ok(())
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>)> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    check_dates(Some(&form.start_date), form.end_date.as_deref())?;

    let new_event = NewEvent {
        title: form.title.trim().to_string(),
        description: form.description,
        location: form.location,
        category: form.category,
        start_date: form.start_date,
        end_date: form.end_date,
        created_by: user.account.id.clone(),
        images: form.images,
        university: form
            .university
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| state.config.university.clone()),
    };

    let event = state.db.create_event(&new_event).await?;
    tracing::info!(event_id = %event.id, user_id = %user.account.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

// ─── Update / Delete ─────────────────────────────────────────────

/// Load an event the caller created.
async fn owned_event(state: &AppState, user: &CurrentUser, event_id: &str) -> Result<Event> {
    let event = state
        .db
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", event_id)))?;

    if event.created_by != user.account.id {
        tracing::warn!(
            event_id = %event_id,
            user_id = %user.account.id,
            "Refusing change to another user's event"
        );
        return Err(AppError::Forbidden(
            "Only the event creator can change this event".to_string(),
        ));
    }
    Ok(event)
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> Result<Json<Event>> {
    let current = owned_event(&state, &user, &event_id).await?;

    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if update.start_date.is_some() || update.end_date.is_some() {
        // Stored start dates are not re-validated
        let start = update.start_date.as_deref().or_else(|| {
            parse_event_date(&current.start_date).map(|_| current.start_date.as_str())
        });
        check_dates(start, update.end_date.as_deref())?;
    }

    let event = state
        .db
        .update_event(&event_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", event_id)))?;
    tracing::info!(event_id = %event_id, "Event updated");
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<String>,
) -> Result<StatusCode> {
    owned_event(&state, &user, &event_id).await?;
    state.db.delete_event(&event_id).await?;
    tracing::info!(event_id = %event_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
