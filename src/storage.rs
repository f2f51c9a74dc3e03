// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client key/value storage.
//!
//! Each browser client (identified by its signed client cookie) owns a
//! namespace of string items, with the same get/set/remove surface a browser
//! offers. Session envelopes, provider sessions and in-progress sign-up state
//! live here so the auth flow never touches ambient global state.

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Well-known storage keys.
pub mod keys {
    /// Direct-auth session envelope (`{currentSession, expiresAt}`)
    pub const SESSION_ENVELOPE: &str = "founderconnect.session";
    /// Provider-issued session
    pub const PROVIDER_SESSION: &str = "founderconnect.provider-session";
    /// E-mail shown on the verification notice
    pub const PENDING_VERIFICATION_EMAIL: &str = "pendingVerificationEmail";
    /// PKCE verifier for an outstanding magic link
    pub const PKCE_VERIFIER: &str = "founderconnect.pkce-verifier";
    /// Serialized sign-up wizard
    pub const SIGNUP_WIZARD: &str = "founderconnect.signup";
    /// When the last confirmation e-mail was requested (Unix seconds)
    pub const VERIFICATION_SENT_AT: &str = "founderconnect.verification-sent-at";
}

struct Namespace {
    items: HashMap<String, String>,
    last_seen: Instant,
}

impl Namespace {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            last_seen: Instant::now(),
        }
    }
}

type Namespaces = Arc<DashMap<String, Namespace>>;

/// All client namespaces, shared across requests.
#[derive(Clone, Default)]
pub struct ClientStore {
    namespaces: Namespaces,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to one client's namespace; marks the client as recently seen.
    pub fn storage(&self, client_id: &str) -> ClientStorage {
        self.namespaces
            .entry(client_id.to_string())
            .or_insert_with(Namespace::new)
            .last_seen = Instant::now();

        ClientStorage {
            client_id: client_id.to_string(),
            namespaces: self.namespaces.clone(),
        }
    }

    /// Number of live client namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Drop namespaces not seen for `max_idle`. Returns how many were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.namespaces.len();
        self.namespaces
            .retain(|_, ns| ns.last_seen.elapsed() < max_idle);
        before.saturating_sub(self.namespaces.len())
    }
}

/// One client's storage namespace.
#[derive(Clone)]
pub struct ClientStorage {
    client_id: String,
    namespaces: Namespaces,
}

impl ClientStorage {
    /// Storage not attached to any shared store.
    pub fn detached() -> Self {
        ClientStore::new().storage("detached")
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.namespaces
            .get(&self.client_id)
            .and_then(|ns| ns.items.get(key).cloned())
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        let mut ns = self
            .namespaces
            .entry(self.client_id.clone())
            .or_insert_with(Namespace::new);
        ns.items.insert(key.to_string(), value.into());
        ns.last_seen = Instant::now();
    }

    pub fn remove_item(&self, key: &str) -> Option<String> {
        self.namespaces
            .get_mut(&self.client_id)
            .and_then(|mut ns| ns.items.remove(key))
    }

    /// Remove every item for this client.
    pub fn clear(&self) {
        if let Some(mut ns) = self.namespaces.get_mut(&self.client_id) {
            ns.items.clear();
        }
    }

    /// Read and deserialize a JSON item. `Ok(None)` when absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.get_item(key)
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
    }

    /// Serialize and store a JSON item.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, raw);
        Ok(())
    }
}
