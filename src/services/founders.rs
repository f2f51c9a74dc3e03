// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Founder directory.

use crate::db::DataStore;
use crate::models::Profile;
use serde::Deserialize;
use std::sync::Arc;

/// Directory filters. Both match case-insensitively on substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FounderQuery {
    /// Matched against name, bio and major
    #[serde(default)]
    pub search: Option<String>,
    /// Matched against each skill tag
    #[serde(default)]
    pub skill: Option<String>,
}

impl FounderQuery {
    pub fn matches(&self, profile: &Profile) -> bool {
        let contains = |field: &Option<String>, needle: &str| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(needle))
        };

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matches_search = search.map_or(true, |needle| {
            contains(&profile.full_name, &needle)
                || contains(&profile.bio, &needle)
                || contains(&profile.major, &needle)
        });

        let skill = self
            .skill
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matches_skill = skill.map_or(true, |needle| {
            profile
                .skills
                .as_ref()
                .is_some_and(|skills| skills.iter().any(|s| s.to_lowercase().contains(&needle)))
        });

        matches_search && matches_skill
    }
}

#[derive(Clone)]
pub struct FounderDirectory {
    db: Arc<dyn DataStore>,
}

impl FounderDirectory {
    pub fn new(db: Arc<dyn DataStore>) -> Self {
        Self { db }
    }

    /// Profiles of members looking for co-founders or talent.
    ///
    /// Falls back to every profile while nobody has declared a founder role.
    /// Read errors are logged and yield an empty list.
    pub async fn list(&self, query: &FounderQuery) -> Vec<Profile> {
        let founders = match self.load().await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load founder profiles");
                return Vec::new();
            }
        };

        founders.into_iter().filter(|p| query.matches(p)).collect()
    }

    async fn load(&self) -> Result<Vec<Profile>, crate::error::AppError> {
        let user_ids = self.db.founder_user_ids().await?;
        if user_ids.is_empty() {
            tracing::debug!("No founder roles found, listing all profiles");
            return self.db.list_profiles().await;
        }
        self.db.list_profiles_for_users(&user_ids).await
    }
}
