// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile provisioning and editing.

use crate::db::DataStore;
use crate::error::AppError;
use crate::models::{split_tags, Account, NewProfile, Profile, ProfileUpdate};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared profile cache keyed by user id.
pub type ProfileCache = Arc<DashMap<String, Profile>>;

/// Per-user locks serializing profile provisioning.
pub type ProvisionLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Profile edit form. Tag fields arrive as comma-separated text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    /// Comma-separated interests
    pub interests: Option<String>,
    /// Comma-separated skills
    pub skills: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
}

impl ProfileForm {
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            full_name: self.full_name,
            bio: self.bio,
            major: self.major,
            year: self.year,
            interests: self.interests.as_deref().map(split_tags),
            skills: self.skills.as_deref().map(split_tags),
            linkedin_url: self.linkedin_url,
            twitter_url: self.twitter_url,
        }
    }
}

/// Finds, creates and updates the profile attached to each account.
///
/// Provisioning follows a fixed order:
/// 1. In-memory cache (no I/O)
/// 2. Per-user lock, then re-check the cache
/// 3. Stored profile
/// 4. Create a default profile
/// 5. Placeholder profile when the create fails (not cached, retried later)
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<dyn DataStore>,
    university: String,
    cache: ProfileCache,
    locks: ProvisionLocks,
}

impl ProfileService {
    pub fn new(db: Arc<dyn DataStore>, university: impl Into<String>) -> Self {
        Self {
            db,
            university: university.into(),
            cache: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Cached profile for a user, if provisioned.
    pub fn cached(&self, user_id: &str) -> Option<Profile> {
        self.cache.get(user_id).map(|p| p.clone())
    }

    /// Drop the cached profile (on sign-out).
    pub fn forget(&self, user_id: &str) {
        self.cache.remove(user_id);
    }

    /// Drop provisioning locks no task is holding.
    pub fn prune_locks(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Profile for `account`, creating a default one on first sight.
    ///
    /// Never fails: data store errors are logged and yield a placeholder.
    pub async fn ensure_profile(&self, account: &Account) -> Profile {
        if let Some(profile) = self.cached(&account.id) {
            return profile;
        }

        let lock = self
            .locks
            .entry(account.id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have provisioned while we waited
        if let Some(profile) = self.cached(&account.id) {
            return profile;
        }

        match self.db.get_profile(&account.id).await {
            Ok(Some(profile)) => {
                self.cache.insert(account.id.clone(), profile.clone());
                return profile;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user_id = %account.id, error = %e, "Failed to fetch profile");
            }
        }

        tracing::info!(user_id = %account.id, "No profile found, creating default profile");
        match self
            .db
            .create_profile(&NewProfile::default_for(account, &self.university))
            .await
        {
            Ok(profile) => {
                self.cache.insert(account.id.clone(), profile.clone());
                profile
            }
            Err(e) => {
                tracing::error!(
                    user_id = %account.id,
                    error = %e,
                    "Failed to create profile, using placeholder"
                );
                Profile::placeholder(account, &self.university)
            }
        }
    }

    /// Store a profile built from sign-up answers.
    ///
    /// Failures are logged; the account already exists and a default
    /// profile will be provisioned on the next bootstrap.
    pub async fn create_profile(&self, account: &Account, profile: NewProfile) -> Option<Profile> {
        let lock = self
            .locks
            .entry(account.id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        match self.db.create_profile(&profile).await {
            Ok(profile) => {
                self.cache.insert(account.id.clone(), profile.clone());
                Some(profile)
            }
            Err(e) => {
                tracing::error!(user_id = %account.id, error = %e, "Error creating profile");
                None
            }
        }
    }

    /// Apply an edit and refresh the cache.
    pub async fn update_profile(
        &self,
        account: &Account,
        form: ProfileForm,
    ) -> Result<Profile, AppError> {
        let update = form.into_update();
        let profile = self
            .db
            .update_profile(&account.id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", account.id)))?;

        tracing::info!(user_id = %account.id, "Profile updated");
        self.cache.insert(account.id.clone(), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn account(id: &str) -> Account {
        Account {
            id: id.to_string(),
            email: format!("{}@chapman.edu", id),
        }
    }

    #[tokio::test]
    async fn test_creates_default_profile_once() {
        let db = Arc::new(MemoryDb::new());
        let service = ProfileService::new(db.clone(), "Chapman University");

        let first = service.ensure_profile(&account("u1")).await;
        service.forget("u1");
        let second = service.ensure_profile(&account("u1")).await;

        assert_eq!(first.id, second.id);
        assert_eq!(first.university, "Chapman University");
        assert!(first.bio.is_none());
        assert!(first.interests.is_none());
        assert_eq!(db.profile_create_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_provisioning_creates_one_profile() {
        let db = Arc::new(MemoryDb::new());
        let service = ProfileService::new(db.clone(), "Chapman University");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.ensure_profile(&account("u1")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(db.profile_create_count(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_on_create_failure_then_retry() {
        let db = Arc::new(MemoryDb::new());
        let service = ProfileService::new(db.clone(), "Chapman University");

        db.set_fail_profile_writes(true);
        let profile = service.ensure_profile(&account("u1")).await;
        assert!(profile.is_placeholder());
        assert!(service.cached("u1").is_none());

        db.set_fail_profile_writes(false);
        let profile = service.ensure_profile(&account("u1")).await;
        assert!(!profile.is_placeholder());
        assert_eq!(db.profile_create_count(), 1);
    }

    #[tokio::test]
    async fn test_prune_drops_idle_locks_only() {
        let db = Arc::new(MemoryDb::new());
        let service = ProfileService::new(db, "Chapman University");
        service.ensure_profile(&account("u1")).await;
        service.ensure_profile(&account("u2")).await;
        assert_eq!(service.locks.len(), 2);

        // A lock still held by a provisioning task survives
        let held = service
            .locks
            .get("u2")
            .map(|lock| Arc::clone(lock.value()))
            .unwrap();
        service.prune_locks();
        assert_eq!(service.locks.len(), 1);
        assert!(service.locks.contains_key("u2"));

        drop(held);
        service.prune_locks();
        assert!(service.locks.is_empty());
    }

    #[tokio::test]
    async fn test_update_splits_tags() {
        let db = Arc::new(MemoryDb::new());
        let service = ProfileService::new(db, "Chapman University");
        let user = account("u1");
        service.ensure_profile(&user).await;

        let updated = service
            .update_profile(
                &user,
                ProfileForm {
                    skills: Some("Rust, , design ".to_string()),
                    ..ProfileForm::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.skills,
            Some(vec!["Rust".to_string(), "design".to_string()])
        );
        assert_eq!(service.cached("u1").unwrap().skills, updated.skills);
    }
}
