// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data store layer (hosted relational tables).

pub mod memory;
pub mod postgrest;

pub use memory::MemoryDb;
pub use postgrest::PostgrestDb;

use crate::error::AppError;
use crate::models::{Event, EventUpdate, NewEvent, NewProfile, Profile, ProfileUpdate, UserRoles};
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const EVENTS: &str = "events";
    /// What each account is looking for (keyed by user_id)
    pub const USER_ROLES: &str = "user_roles";
}

/// Typed operations against the hosted data store.
#[async_trait]
pub trait DataStore: Send + Sync {
    // ─── Profiles ────────────────────────────────────────────────

    /// Get the profile owned by an account.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// Insert a profile and return the stored row.
    async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, AppError>;

    /// Update the profile owned by an account; `None` if it has no profile.
    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, AppError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;

    /// Profiles whose `user_id` is one of `user_ids`.
    async fn list_profiles_for_users(&self, user_ids: &[String])
        -> Result<Vec<Profile>, AppError>;

    // ─── User Roles ──────────────────────────────────────────────

    /// Account ids flagged as founders (looking for a co-founder or talent).
    async fn founder_user_ids(&self) -> Result<Vec<String>, AppError>;

    async fn upsert_user_roles(&self, roles: &UserRoles) -> Result<(), AppError>;

    // ─── Events ──────────────────────────────────────────────────

    /// Events ordered by ascending start date, optionally for one university.
    async fn list_events(&self, university: Option<&str>) -> Result<Vec<Event>, AppError>;

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, AppError>;

    async fn create_event(&self, event: &NewEvent) -> Result<Event, AppError>;

    async fn update_event(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> Result<Option<Event>, AppError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError>;
}
