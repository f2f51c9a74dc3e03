// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model: the application-level user record keyed to an account.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Account;

/// Id prefix marking a profile that only exists in memory.
pub const PLACEHOLDER_PROFILE_PREFIX: &str = "local-";

/// Profile row stored in the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub id: String,
    pub user_id: Option<String>,
    pub university: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    /// Class year (freshman, sophomore, ...)
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Profile {
    /// In-memory stand-in used when the store refused to create a profile.
    pub fn placeholder(account: &Account, university: &str) -> Self {
        Self {
            id: format!("{}{}", PLACEHOLDER_PROFILE_PREFIX, account.id),
            user_id: Some(account.id.clone()),
            university: university.to_string(),
            full_name: None,
            bio: None,
            major: None,
            year: None,
            interests: None,
            skills: None,
            linkedin_url: None,
            twitter_url: None,
            created_at: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PROFILE_PREFIX)
    }
}

/// Insert payload for a new profile (the store assigns `id` and `created_at`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub user_id: String,
    pub university: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub interests: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
}

impl NewProfile {
    /// Default profile for an account signing in for the first time.
    pub fn default_for(account: &Account, university: &str) -> Self {
        Self {
            user_id: account.id.clone(),
            university: university.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
}

impl ProfileUpdate {
    /// Apply this update to a profile in place.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(v) = &self.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &self.major {
            profile.major = Some(v.clone());
        }
        if let Some(v) = &self.year {
            profile.year = Some(v.clone());
        }
        if let Some(v) = &self.interests {
            profile.interests = Some(v.clone());
        }
        if let Some(v) = &self.skills {
            profile.skills = Some(v.clone());
        }
        if let Some(v) = &self.linkedin_url {
            profile.linkedin_url = Some(v.clone());
        }
        if let Some(v) = &self.twitter_url {
            profile.twitter_url = Some(v.clone());
        }
    }
}

/// Split comma-separated free text into trimmed, non-empty tags.
pub fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
