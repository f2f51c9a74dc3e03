// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process data store for offline development and tests.
//!
//! Mirrors the hosted tables closely enough for the service layer: rows get
//! generated ids and `created_at`, events come back ordered by start date.
//! Failures can be injected to exercise degraded paths.

use crate::db::DataStore;
use crate::error::AppError;
use crate::models::{Event, EventUpdate, NewEvent, NewProfile, Profile, ProfileUpdate, UserRoles};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory data store.
#[derive(Default)]
pub struct MemoryDb {
    /// Profiles keyed by profile id
    profiles: DashMap<String, Profile>,
    /// Events keyed by event id
    events: DashMap<String, Event>,
    /// Roles keyed by user id
    user_roles: DashMap<String, UserRoles>,
    fail_reads: AtomicBool,
    fail_profile_writes: AtomicBool,
    profile_creates: AtomicUsize,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make profile inserts and updates fail with a database error.
    pub fn set_fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful profile inserts so far.
    pub fn profile_create_count(&self) -> usize {
        self.profile_creates.load(Ordering::SeqCst)
    }

    /// Seed an event row directly (ids and timestamps taken as given).
    pub fn insert_event(&self, event: Event) {
        self.events.insert(event.id.clone(), event);
    }

    /// Roles stored for an account, if any.
    pub fn user_roles(&self, user_id: &str) -> Option<UserRoles> {
        self.user_roles.get(user_id).map(|r| r.clone())
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_profile_write(&self) -> Result<(), AppError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "injected profile write failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.check_read()?;
        Ok(self
            .profiles
            .iter()
            .find(|p| p.user_id.as_deref() == Some(user_id))
            .map(|p| p.clone()))
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        self.check_profile_write()?;

        let stored = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: Some(profile.user_id.clone()),
            university: profile.university.clone(),
            full_name: profile.full_name.clone(),
            bio: profile.bio.clone(),
            major: profile.major.clone(),
            year: profile.year.clone(),
            interests: profile.interests.clone(),
            skills: profile.skills.clone(),
            linkedin_url: profile.linkedin_url.clone(),
            twitter_url: profile.twitter_url.clone(),
            created_at: Some(format_utc_rfc3339(chrono::Utc::now())),
        };
        self.profiles.insert(stored.id.clone(), stored.clone());
        self.profile_creates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, AppError> {
        self.check_profile_write()?;

        let mut updated = None;
        for mut entry in self.profiles.iter_mut() {
            if entry.user_id.as_deref() == Some(user_id) {
                update.apply_to(entry.value_mut());
                updated = Some(entry.clone());
            }
        }
        Ok(updated)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.check_read()?;
        let mut profiles: Vec<Profile> = self.profiles.iter().map(|p| p.clone()).collect();
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(profiles)
    }

    async fn list_profiles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<Profile>, AppError> {
        Ok(self
            .list_profiles()
            .await?
            .into_iter()
            .filter(|p| {
                p.user_id
                    .as_ref()
                    .is_some_and(|id| user_ids.iter().any(|u| u == id))
            })
            .collect())
    }

    async fn founder_user_ids(&self) -> Result<Vec<String>, AppError> {
        self.check_read()?;
        Ok(self
            .user_roles
            .iter()
            .filter(|r| r.is_founder())
            .map(|r| r.user_id.clone())
            .collect())
    }

    async fn upsert_user_roles(&self, roles: &UserRoles) -> Result<(), AppError> {
        self.user_roles.insert(roles.user_id.clone(), roles.clone());
        Ok(())
    }

    async fn list_events(&self, university: Option<&str>) -> Result<Vec<Event>, AppError> {
        self.check_read()?;
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| university.map_or(true, |u| e.university == u))
            .map(|e| e.clone())
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(events)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, AppError> {
        self.check_read()?;
        Ok(self.events.get(event_id).map(|e| e.clone()))
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event, AppError> {
        let stored = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            category: event.category.clone(),
            start_date: event.start_date.clone(),
            end_date: event.end_date.clone(),
            created_by: event.created_by.clone(),
            images: event.images.clone(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
            university: event.university.clone(),
        };
        self.events.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_event(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> Result<Option<Event>, AppError> {
        Ok(self.events.get_mut(event_id).map(|mut event| {
            update.apply_to(event.value_mut());
            event.clone()
        }))
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        self.events.remove(event_id);
        Ok(())
    }
}
