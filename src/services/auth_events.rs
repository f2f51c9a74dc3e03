// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth state change notifications.

use crate::models::Account;
use crate::services::profiles::ProfileService;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub account: Account,
}

/// Broadcast of sign-in and sign-out events.
#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    pub fn signed_in(&self, account: &Account) {
        self.emit(AuthEventKind::SignedIn, account);
    }

    pub fn signed_out(&self, account: &Account) {
        self.emit(AuthEventKind::SignedOut, account);
    }

    fn emit(&self, kind: AuthEventKind, account: &Account) {
        tracing::debug!(user_id = %account.id, event = ?kind, "Auth state changed");
        // No subscribers is fine
        let _ = self.tx.send(AuthEvent {
            kind,
            account: account.clone(),
        });
    }
}

/// Keep profiles in step with auth state: provision on sign-in, forget the
/// cached profile on sign-out.
pub fn spawn_profile_listener(events: &AuthEvents, profiles: ProfileService) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AuthEvent {
                    kind: AuthEventKind::SignedIn,
                    account,
                }) => {
                    profiles.ensure_profile(&account).await;
                }
                Ok(AuthEvent {
                    kind: AuthEventKind::SignedOut,
                    account,
                }) => {
                    profiles.forget(&account.id);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Auth event listener stopped");
    })
}
