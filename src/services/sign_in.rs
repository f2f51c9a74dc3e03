// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in resolution.
//!
//! Strategies are tried in order:
//! 1. Direct auth for configured staging accounts (no password check)
//! 2. Password sign-in with the identity provider
//! 3. Magic link, when the provider refuses the password path
//!
//! Direct auth is a staging convenience and not an access control: an
//! allow-listed e-mail signs in whatever password is supplied.

use crate::config::Config;
use crate::crypto::{pkce_challenge, pkce_verifier};
use crate::error::AppError;
use crate::middleware::auth::create_direct_token;
use crate::models::{Account, Session, SessionEnvelope};
use crate::services::auth_events::AuthEvents;
use crate::services::identity::IdentityProvider;
use crate::storage::{keys, ClientStorage};
use serde::Serialize;
use std::sync::Arc;

/// Lifetime of a direct-auth session.
pub const DIRECT_AUTH_TTL_SECS: i64 = 60 * 60;
/// Refresh token value marking a direct-auth session (it cannot be refreshed).
pub const DIRECT_AUTH_REFRESH_MARKER: &str = "direct-auth";

/// Which strategy settled a sign-in attempt.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Allow-listed account; a local session envelope was stored.
    DirectAuth { session: Session },
    /// Provider accepted the password; its session was stored.
    Password { session: Session },
    /// Provider refused the password for a reason that does not warrant a magic link.
    PasswordRejected { error: AppError },
    /// Password path unavailable; a magic link was e-mailed.
    MagicLinkSent { email: String },
    /// Password path unavailable and the magic link could not be sent either.
    MagicLinkFailed { error: AppError },
}

impl SignInOutcome {
    pub fn used_direct_auth(&self) -> bool {
        matches!(self, SignInOutcome::DirectAuth { .. })
    }

    pub fn used_magic_link(&self) -> bool {
        matches!(
            self,
            SignInOutcome::MagicLinkSent { .. } | SignInOutcome::MagicLinkFailed { .. }
        )
    }

    /// Session established by this attempt, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SignInOutcome::DirectAuth { session } | SignInOutcome::Password { session } => {
                Some(session)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            SignInOutcome::PasswordRejected { error } | SignInOutcome::MagicLinkFailed { error } => {
                Some(error)
            }
            _ => None,
        }
    }
}

/// JSON view of a sign-in outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInView {
    pub user: Option<Account>,
    pub used_direct_auth: bool,
    pub used_magic_link: bool,
    /// Where the client should go next
    pub redirect_to: Option<String>,
    /// Inline message for the form
    pub message: Option<String>,
    pub error: Option<String>,
}

impl From<&SignInOutcome> for SignInView {
    fn from(outcome: &SignInOutcome) -> Self {
        let (redirect_to, message) = match outcome {
            SignInOutcome::DirectAuth { .. } | SignInOutcome::Password { .. } => {
                (Some("/dashboard".to_string()), None)
            }
            SignInOutcome::MagicLinkSent { email } => (
                None,
                Some(format!("Check your inbox: we sent a sign-in link to {}", email)),
            ),
            _ => (None, None),
        };

        Self {
            user: outcome.session().map(|s| s.user.clone()),
            used_direct_auth: outcome.used_direct_auth(),
            used_magic_link: outcome.used_magic_link(),
            redirect_to,
            message,
            error: outcome.error().map(AppError::user_message),
        }
    }
}

#[derive(Clone)]
pub struct SignInResolver {
    identity: Arc<dyn IdentityProvider>,
    events: AuthEvents,
    config: Arc<Config>,
    token_key: Arc<Vec<u8>>,
    callback_url: String,
}

impl SignInResolver {
    pub fn new(
        config: &Config,
        identity: Arc<dyn IdentityProvider>,
        events: AuthEvents,
        token_key: Vec<u8>,
    ) -> Self {
        Self {
            identity,
            events,
            config: Arc::new(config.clone()),
            token_key: Arc::new(token_key),
            callback_url: config.callback_url(),
        }
    }

    /// Sign a client in with an e-mail and password.
    ///
    /// Provider errors are reported inside the outcome; `Err` is reserved
    /// for local failures (randomness, serialization).
    pub async fn sign_in(
        &self,
        storage: &ClientStorage,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, AppError> {
        let email = email.trim();

        if let Some(entry) = self.config.direct_auth_account(email) {
            return self.direct_sign_in(storage, entry.user_id.clone(), email);
        }

        match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => {
                storage
                    .set_json(keys::PROVIDER_SESSION, &session)
                    .map_err(|e| AppError::Internal(e.into()))?;
                storage.remove_item(keys::SESSION_ENVELOPE);
                tracing::info!(user_id = %session.user.id, "Password sign-in succeeded");
                self.events.signed_in(&session.user);
                Ok(SignInOutcome::Password { session })
            }
            Err(e) if e.is_email_login_disabled() || e.is_invalid_credentials() => {
                tracing::info!(error = %e, "Password sign-in refused, falling back to magic link");
                self.send_magic_link(storage, email).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password sign-in failed");
                Ok(SignInOutcome::PasswordRejected { error: e })
            }
        }
    }

    fn direct_sign_in(
        &self,
        storage: &ClientStorage,
        user_id: String,
        email: &str,
    ) -> Result<SignInOutcome, AppError> {
        let account = Account {
            id: user_id,
            email: email.to_string(),
        };
        let expires_at = chrono::Utc::now().timestamp() + DIRECT_AUTH_TTL_SECS;
        let access_token = create_direct_token(&account, expires_at, &self.token_key)?;

        let session = Session {
            access_token,
            refresh_token: DIRECT_AUTH_REFRESH_MARKER.to_string(),
            token_type: "bearer".to_string(),
            expires_at,
            user: account,
        };
        let envelope = SessionEnvelope {
            current_session: session.clone(),
            expires_at,
        };
        storage
            .set_json(keys::SESSION_ENVELOPE, &envelope)
            .map_err(|e| AppError::Internal(e.into()))?;
        storage.remove_item(keys::PROVIDER_SESSION);

        tracing::info!(user_id = %session.user.id, "Direct-auth sign-in");
        self.events.signed_in(&session.user);
        Ok(SignInOutcome::DirectAuth { session })
    }

    async fn send_magic_link(
        &self,
        storage: &ClientStorage,
        email: &str,
    ) -> Result<SignInOutcome, AppError> {
        let verifier = pkce_verifier()?;
        let challenge = pkce_challenge(&verifier);

        match self
            .identity
            .sign_in_with_otp(email, &self.callback_url, &challenge)
            .await
        {
            Ok(()) => {
                storage.set_item(keys::PKCE_VERIFIER, verifier);
                storage.set_item(keys::PENDING_VERIFICATION_EMAIL, email);
                storage.set_item(
                    keys::VERIFICATION_SENT_AT,
                    chrono::Utc::now().timestamp().to_string(),
                );
                Ok(SignInOutcome::MagicLinkSent {
                    email: email.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Magic link request failed");
                Ok(SignInOutcome::MagicLinkFailed { error: e })
            }
        }
    }

    /// Finish a magic-link or confirmation-link sign-in.
    pub async fn complete_callback(
        &self,
        storage: &ClientStorage,
        auth_code: &str,
    ) -> Result<Session, AppError> {
        let verifier = storage.remove_item(keys::PKCE_VERIFIER).unwrap_or_default();
        let session = self
            .identity
            .exchange_code_for_session(auth_code, &verifier)
            .await?;

        storage
            .set_json(keys::PROVIDER_SESSION, &session)
            .map_err(|e| AppError::Internal(e.into()))?;
        storage.remove_item(keys::SESSION_ENVELOPE);
        storage.remove_item(keys::PENDING_VERIFICATION_EMAIL);
        storage.remove_item(keys::VERIFICATION_SENT_AT);

        tracing::info!(user_id = %session.user.id, "Auth code exchanged for session");
        self.events.signed_in(&session.user);
        Ok(session)
    }
}
