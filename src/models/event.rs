// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus event model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Event row stored in the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-form location document (venue, room, or virtual link)
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub location: serde_json::Value,
    pub category: String,
    /// Start date/time (ISO 8601)
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Account id of the creator
    pub created_by: String,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    pub created_at: String,
    pub university: String,
}

/// Insert payload for a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: serde_json::Value,
    pub category: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_by: String,
    pub images: Option<Vec<String>>,
    pub university: String,
}

/// Partial event update; creator and timestamps are immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
}

impl EventUpdate {
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(v) = &self.title {
            event.title = v.clone();
        }
        if let Some(v) = &self.description {
            event.description = v.clone();
        }
        if let Some(v) = &self.location {
            event.location = v.clone();
        }
        if let Some(v) = &self.category {
            event.category = v.clone();
        }
        if let Some(v) = &self.start_date {
            event.start_date = v.clone();
        }
        if let Some(v) = &self.end_date {
            event.end_date = Some(v.clone());
        }
        if let Some(v) = &self.images {
            event.images = Some(v.clone());
        }
        if let Some(v) = &self.university {
            event.university = v.clone();
        }
    }
}
