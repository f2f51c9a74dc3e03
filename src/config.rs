// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honored for local
//! development.

use std::env;

/// Minimum length of `SESSION_SIGNING_KEY` in bytes.
const MIN_SIGNING_KEY_LEN: usize = 32;

/// Which backend implementations to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Hosted identity provider and data store over HTTP.
    Remote,
    /// In-process identity provider and data store (offline development).
    Memory,
}

/// An account eligible for direct (password-less) sign-in on staging setups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAuthAccount {
    pub email: String,
    pub user_id: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Backend-as-a-service ---
    /// Base URL of the hosted backend (identity provider + data store)
    pub backend_url: String,
    /// Public (anon) API key sent with every backend request
    pub backend_anon_key: String,
    pub backend_mode: BackendMode,

    // --- Service ---
    /// Frontend URL for redirects, CORS and cookie attributes
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// How long an idle client storage namespace is kept
    pub client_idle_ttl_secs: u64,

    // --- Institution ---
    /// Institution name written into new profiles
    pub university: String,
    /// E-mail domain accepted by sign-up (without `@`)
    pub institution_email_domain: String,

    // --- Secrets ---
    /// Master key for client cookie signatures and direct-auth tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Staging accounts allowed to sign in without password verification
    pub direct_auth_accounts: Vec<DirectAuthAccount>,
}

impl Config {
    /// Config for tests: memory backends, localhost frontend, no allow-list.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            backend_anon_key: "test_anon_key".to_string(),
            backend_mode: BackendMode::Memory,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            client_idle_ttl_secs: 7 * 24 * 60 * 60,
            university: "Chapman University".to_string(),
            institution_email_domain: "chapman.edu".to_string(),
            session_signing_key: b"test_session_key_32_bytes_minimum!!".to_vec(),
            direct_auth_accounts: Vec::new(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend_mode = match env::var("BACKEND_MODE")
            .unwrap_or_else(|_| "remote".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "remote" => BackendMode::Remote,
            "memory" => BackendMode::Memory,
            _ => return Err(ConfigError::Invalid("BACKEND_MODE", "expected remote or memory")),
        };

        let (backend_url, backend_anon_key) = match backend_mode {
            BackendMode::Remote => (
                env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
                env::var("BACKEND_ANON_KEY")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("BACKEND_ANON_KEY"))?,
            ),
            BackendMode::Memory => (
                env::var("BACKEND_URL").unwrap_or_else(|_| "memory://".to_string()),
                env::var("BACKEND_ANON_KEY").unwrap_or_default(),
            ),
        };

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .into_bytes();
        if session_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                "must be at least 32 bytes",
            ));
        }

        let direct_auth_accounts = match env::var("DIRECT_AUTH_ACCOUNTS") {
            Ok(raw) => parse_direct_auth_accounts(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            backend_anon_key,
            backend_mode,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            client_idle_ttl_secs: env::var("CLIENT_IDLE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7 * 24 * 60 * 60),
            university: env::var("UNIVERSITY_NAME")
                .unwrap_or_else(|_| "Chapman University".to_string()),
            institution_email_domain: env::var("INSTITUTION_EMAIL_DOMAIN")
                .map(|v| v.trim().trim_start_matches('@').to_lowercase())
                .unwrap_or_else(|_| "chapman.edu".to_string()),
            session_signing_key,
            direct_auth_accounts,
        })
    }

    /// Where magic links and e-mail confirmations send the browser back to.
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.frontend_url.trim_end_matches('/'))
    }

    /// Required suffix for sign-up e-mail addresses, e.g. `@chapman.edu`.
    pub fn institution_email_suffix(&self) -> String {
        format!("@{}", self.institution_email_domain)
    }

    /// Look up a direct-auth account by e-mail (case-insensitive).
    pub fn direct_auth_account(&self, email: &str) -> Option<&DirectAuthAccount> {
        let email = email.trim().to_lowercase();
        self.direct_auth_accounts.iter().find(|a| a.email == email)
    }

    /// Cookies get the `Secure` attribute when the frontend is served over TLS.
    pub fn uses_secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Parse `email:user_id` pairs separated by commas.
fn parse_direct_auth_accounts(raw: &str) -> Result<Vec<DirectAuthAccount>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (email, user_id) = entry.split_once(':').ok_or(ConfigError::Invalid(
                "DIRECT_AUTH_ACCOUNTS",
                "entries must look like email:user_id",
            ))?;
            let (email, user_id) = (email.trim(), user_id.trim());
            if email.is_empty() || user_id.is_empty() {
                return Err(ConfigError::Invalid(
                    "DIRECT_AUTH_ACCOUNTS",
                    "entries must look like email:user_id",
                ));
            }
            Ok(DirectAuthAccount {
                email: email.to_lowercase(),
                user_id: user_id.to_string(),
            })
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
