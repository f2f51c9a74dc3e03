// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session bootstrap: decide whether a client is signed in, and as whom.
//!
//! Resolution order, first match wins:
//! 1. Direct-auth envelope in client storage (token verified, not expired)
//! 2. Provider-issued session in client storage (refreshed near expiry,
//!    then confirmed with the identity provider)
//! 3. Anonymous
//!
//! Every failure along the way is logged and degrades to the next step;
//! nothing here returns an error to the caller.

use crate::error::AppError;
use crate::middleware::auth::verify_direct_token;
use crate::models::{Account, Profile, Session, SessionEnvelope};
use crate::services::auth_events::AuthEvents;
use crate::services::identity::IdentityProvider;
use crate::services::profiles::ProfileService;
use crate::storage::{keys, ClientStorage};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Refresh provider sessions this close to expiry.
const SESSION_REFRESH_MARGIN_SECS: i64 = 60;

/// Where the current account came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    DirectAuth,
    Provider,
}

/// Signed-in account with its profile.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub account: Account,
    pub profile: Profile,
    pub source: SessionSource,
}

#[derive(Debug, Clone)]
pub enum AuthState {
    Anonymous,
    Authenticated(CurrentUser),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Anonymous => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionBootstrap {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileService,
    events: AuthEvents,
    token_key: Arc<Vec<u8>>,
    /// Per-client mutex so concurrent requests refresh a session only once
    refresh_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl SessionBootstrap {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: ProfileService,
        events: AuthEvents,
        token_key: Vec<u8>,
    ) -> Self {
        Self {
            identity,
            profiles,
            events,
            token_key: Arc::new(token_key),
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Resolve the client's auth state, provisioning a profile on first sight.
    pub async fn resolve(&self, storage: &ClientStorage) -> AuthState {
        match self.peek_account(storage).await {
            Some((account, source)) => {
                let profile = self.profiles.ensure_profile(&account).await;
                AuthState::Authenticated(CurrentUser {
                    account,
                    profile,
                    source,
                })
            }
            None => AuthState::Anonymous,
        }
    }

    /// Resolve the current account without touching profiles.
    pub async fn peek_account(&self, storage: &ClientStorage) -> Option<(Account, SessionSource)> {
        if let Some(account) = self.direct_session(storage) {
            return Some((account, SessionSource::DirectAuth));
        }
        self.provider_session(storage)
            .await
            .map(|account| (account, SessionSource::Provider))
    }

    /// Clear every session the client holds and revoke the provider session.
    ///
    /// Returns the account that was signed in, if any.
    pub async fn sign_out(&self, storage: &ClientStorage) -> Option<Account> {
        let direct = storage
            .get_json::<SessionEnvelope>(keys::SESSION_ENVELOPE)
            .ok()
            .flatten()
            .map(|envelope| envelope.current_session.user);
        let provider = storage
            .get_json::<Session>(keys::PROVIDER_SESSION)
            .ok()
            .flatten();

        storage.remove_item(keys::SESSION_ENVELOPE);
        storage.remove_item(keys::PROVIDER_SESSION);

        if let Some(session) = &provider {
            if let Err(e) = self.identity.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Failed to revoke provider session");
            }
        }

        let account = direct.or(provider.map(|s| s.user));
        if let Some(account) = &account {
            tracing::info!(user_id = %account.id, "Signed out");
            self.events.signed_out(account);
        }
        account
    }

    /// Drop refresh locks no request is holding.
    pub fn prune_refresh_locks(&self) {
        self.refresh_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    fn direct_session(&self, storage: &ClientStorage) -> Option<Account> {
        let envelope = match storage.get_json::<SessionEnvelope>(keys::SESSION_ENVELOPE) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed session envelope");
                storage.remove_item(keys::SESSION_ENVELOPE);
                return None;
            }
        };

        let now = chrono::Utc::now().timestamp();
        if envelope.expires_at <= now {
            tracing::debug!("Direct-auth session expired");
            storage.remove_item(keys::SESSION_ENVELOPE);
            return None;
        }

        let session = envelope.current_session;
        match verify_direct_token(&session.access_token, &self.token_key) {
            Ok(claims) if claims.sub == session.user.id => Some(session.user),
            Ok(_) => {
                tracing::warn!("Direct-auth token subject mismatch");
                storage.remove_item(keys::SESSION_ENVELOPE);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting direct-auth session");
                storage.remove_item(keys::SESSION_ENVELOPE);
                None
            }
        }
    }

    async fn provider_session(&self, storage: &ClientStorage) -> Option<Account> {
        let session = self.load_provider_session(storage)?;

        let now = chrono::Utc::now().timestamp();
        let session = if session.expires_within(now, SESSION_REFRESH_MARGIN_SECS) {
            self.refresh(storage).await?
        } else {
            session
        };

        match self.identity.get_user(&session.access_token).await {
            Ok(account) => Some(account),
            Err(AppError::IdentityUnavailable(e)) => {
                // Keep the session; the provider may come back
                tracing::warn!(error = %e, "Identity provider unavailable, treating as anonymous");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Provider rejected stored session");
                storage.remove_item(keys::PROVIDER_SESSION);
                None
            }
        }
    }

    fn load_provider_session(&self, storage: &ClientStorage) -> Option<Session> {
        match storage.get_json::<Session>(keys::PROVIDER_SESSION) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed provider session");
                storage.remove_item(keys::PROVIDER_SESSION);
                None
            }
        }
    }

    async fn refresh(&self, storage: &ClientStorage) -> Option<Session> {
        let lock = self
            .refresh_locks
            .entry(storage.client_id().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another request may have refreshed while we waited
        let session = self.load_provider_session(storage)?;
        let now = chrono::Utc::now().timestamp();
        if !session.expires_within(now, SESSION_REFRESH_MARGIN_SECS) {
            return Some(session);
        }

        match self.identity.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                tracing::debug!(user_id = %fresh.user.id, "Provider session refreshed");
                if let Err(e) = storage.set_json(keys::PROVIDER_SESSION, &fresh) {
                    tracing::error!(error = %e, "Failed to store refreshed session");
                }
                Some(fresh)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                if !matches!(e, AppError::IdentityUnavailable(_)) {
                    storage.remove_item(keys::PROVIDER_SESSION);
                }
                None
            }
        }
    }
}
