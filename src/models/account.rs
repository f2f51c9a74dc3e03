// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity record issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Credential bundle proving an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry (Unix timestamp, seconds)
    pub expires_at: i64,
    pub user: Account,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the session expires within `margin_secs` of `now`.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at <= now + margin_secs
    }
}

/// Locally synthesized session as persisted in client storage.
///
/// Serialized as `{"currentSession": {...}, "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnvelope {
    pub current_session: Session,
    /// Expiry (Unix timestamp, seconds)
    pub expires_at: i64,
}
