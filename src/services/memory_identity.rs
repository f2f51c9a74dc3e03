// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process identity provider for offline development and tests.
//!
//! Behaves like the hosted provider for the flows this service uses:
//! password accounts with optional e-mail confirmation, PKCE-bound magic
//! links, rotating refresh tokens and revocation. Switches let tests put it
//! in the states the hosted provider can be in (password login disabled,
//! confirmation required, unreachable).

use crate::crypto::{pkce_challenge, random_token};
use crate::error::AppError;
use crate::models::{Account, Session};
use crate::services::identity::{IdentityProvider, SignUpResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

const DEFAULT_SESSION_TTL_SECS: i64 = 3600;
const MIN_PASSWORD_LEN: usize = 6;

struct StoredUser {
    account: Account,
    password: String,
    confirmed: bool,
}

#[derive(Clone)]
struct IssuedSession {
    account: Account,
    refresh_token: String,
    expires_at: i64,
}

/// A link the provider would have e-mailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentLink {
    pub email: String,
    pub redirect_to: String,
    /// Authorization code carried by the link
    pub code: String,
}

struct PendingCode {
    email: String,
    /// PKCE challenge the code is bound to; confirmation links carry none
    challenge: Option<String>,
}

/// In-memory identity provider.
pub struct MemoryIdentityProvider {
    /// Users keyed by lowercased e-mail
    users: DashMap<String, StoredUser>,
    /// Live sessions keyed by access token
    sessions: DashMap<String, IssuedSession>,
    /// Refresh token -> access token
    refresh_tokens: DashMap<String, String>,
    codes: DashMap<String, PendingCode>,
    magic_links: Mutex<Vec<SentLink>>,
    confirmation_emails: Mutex<Vec<SentLink>>,
    email_logins_disabled: AtomicBool,
    require_confirmation: AtomicBool,
    unavailable: AtomicBool,
    session_ttl_secs: AtomicI64,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self {
            users: DashMap::new(),
            sessions: DashMap::new(),
            refresh_tokens: DashMap::new(),
            codes: DashMap::new(),
            magic_links: Mutex::new(Vec::new()),
            confirmation_emails: Mutex::new(Vec::new()),
            email_logins_disabled: AtomicBool::new(false),
            require_confirmation: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
            session_ttl_secs: AtomicI64::new(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

fn record(log: &Mutex<Vec<SentLink>>, link: SentLink) {
    log.lock().unwrap_or_else(|e| e.into_inner()).push(link);
}

fn snapshot(log: &Mutex<Vec<SentLink>>) -> Vec<SentLink> {
    log.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject password sign-in the way the hosted provider does when the
    /// e-mail login method is switched off.
    pub fn set_email_logins_disabled(&self, disabled: bool) {
        self.email_logins_disabled.store(disabled, Ordering::SeqCst);
    }

    /// Require e-mail confirmation before sign-up yields a session.
    pub fn set_require_confirmation(&self, required: bool) {
        self.require_confirmation.store(required, Ordering::SeqCst);
    }

    /// Fail every call as if the provider were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Lifetime of newly issued sessions. Zero or negative issues expired sessions.
    pub fn set_session_ttl_secs(&self, ttl: i64) {
        self.session_ttl_secs.store(ttl, Ordering::SeqCst);
    }

    /// Create a confirmed account directly.
    pub fn register_confirmed(&self, email: &str, password: &str) -> Account {
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
        };
        self.users.insert(
            account.email.clone(),
            StoredUser {
                account: account.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        account
    }

    /// Magic links sent so far, oldest first.
    pub fn magic_links_sent(&self) -> Vec<SentLink> {
        snapshot(&self.magic_links)
    }

    /// Confirmation e-mails sent so far (sign-up and resends), oldest first.
    pub fn confirmation_emails_sent(&self) -> Vec<SentLink> {
        snapshot(&self.confirmation_emails)
    }

    /// Number of live (unrevoked) sessions.
    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::IdentityUnavailable(
                "memory identity provider offline".to_string(),
            ));
        }
        Ok(())
    }

    fn issue_session(&self, account: Account) -> Result<Session, AppError> {
        let access_token = random_token(32)?;
        let refresh_token = random_token(24)?;
        let expires_at =
            chrono::Utc::now().timestamp() + self.session_ttl_secs.load(Ordering::SeqCst);

        self.sessions.insert(
            access_token.clone(),
            IssuedSession {
                account: account.clone(),
                refresh_token: refresh_token.clone(),
                expires_at,
            },
        );
        self.refresh_tokens
            .insert(refresh_token.clone(), access_token.clone());

        Ok(Session {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_at,
            user: account,
        })
    }

    fn issue_code(
        &self,
        email: &str,
        challenge: Option<String>,
    ) -> Result<String, AppError> {
        let code = random_token(16)?;
        self.codes.insert(
            code.clone(),
            PendingCode {
                email: email.to_string(),
                challenge,
            },
        );
        Ok(code)
    }

    fn revoke(&self, access_token: &str) {
        if let Some((_, issued)) = self.sessions.remove(access_token) {
            self.refresh_tokens.remove(&issued.refresh_token);
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResult, AppError> {
        self.check_available()?;

        let email = email.trim().to_lowercase();
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Identity(
                "Password should be at least 6 characters".to_string(),
            ));
        }
        if self.users.contains_key(&email) {
            return Err(AppError::Identity("User already registered".to_string()));
        }

        let confirmed = !self.require_confirmation.load(Ordering::SeqCst);
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
        };
        self.users.insert(
            email.clone(),
            StoredUser {
                account: account.clone(),
                password: password.to_string(),
                confirmed,
            },
        );
        tracing::debug!(user_id = %account.id, confirmed, "Memory provider account created");

        if !confirmed {
            let code = self.issue_code(&email, None)?;
            record(
                &self.confirmation_emails,
                SentLink {
                    email,
                    redirect_to: redirect_to.to_string(),
                    code,
                },
            );
            return Ok(SignUpResult {
                user: Some(account),
                session: None,
            });
        }

        let session = self.issue_session(account.clone())?;
        Ok(SignUpResult {
            user: Some(account),
            session: Some(session),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        self.check_available()?;

        if self.email_logins_disabled.load(Ordering::SeqCst) {
            return Err(AppError::Identity(
                AppError::EMAIL_LOGINS_DISABLED.to_string(),
            ));
        }

        let account = {
            let user = self
                .users
                .get(&email.trim().to_lowercase())
                .filter(|u| u.password == password)
                .ok_or_else(|| AppError::Identity(AppError::INVALID_CREDENTIALS.to_string()))?;
            if !user.confirmed {
                return Err(AppError::Identity("Email not confirmed".to_string()));
            }
            user.account.clone()
        };

        self.issue_session(account)
    }

    async fn sign_in_with_otp(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AppError> {
        self.check_available()?;

        let email = email.trim().to_lowercase();
        if !self.users.contains_key(&email) {
            return Err(AppError::Identity("Signups not allowed for otp".to_string()));
        }

        let code = self.issue_code(&email, Some(code_challenge.to_string()))?;
        record(
            &self.magic_links,
            SentLink {
                email,
                redirect_to: redirect_to.to_string(),
                code,
            },
        );
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.check_available()?;
        self.revoke(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Account, AppError> {
        self.check_available()?;

        let issued = self
            .sessions
            .get(access_token)
            .map(|s| s.clone())
            .ok_or_else(|| AppError::Identity("invalid JWT: session not found".to_string()))?;
        if issued.expires_at <= chrono::Utc::now().timestamp() {
            return Err(AppError::Identity(
                "invalid JWT: token is expired".to_string(),
            ));
        }
        Ok(issued.account)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError> {
        self.check_available()?;

        let (_, access_token) = self.refresh_tokens.remove(refresh_token).ok_or_else(|| {
            AppError::Identity("Invalid Refresh Token: Refresh Token Not Found".to_string())
        })?;
        let (_, issued) = self.sessions.remove(&access_token).ok_or_else(|| {
            AppError::Identity("Invalid Refresh Token: Refresh Token Not Found".to_string())
        })?;

        self.issue_session(issued.account)
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, AppError> {
        self.check_available()?;

        let (_, pending) = self
            .codes
            .remove(auth_code)
            .ok_or_else(|| AppError::Identity("invalid flow state, no valid flow state found".to_string()))?;

        if let Some(challenge) = &pending.challenge {
            if pkce_challenge(code_verifier) != *challenge {
                return Err(AppError::Identity(
                    "code challenge does not match previously saved code verifier".to_string(),
                ));
            }
        }

        let account = {
            let mut user = self
                .users
                .get_mut(&pending.email)
                .ok_or_else(|| AppError::Identity("User not found".to_string()))?;
            user.confirmed = true;
            user.account.clone()
        };

        self.issue_session(account)
    }

    async fn resend_signup_confirmation(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError> {
        self.check_available()?;

        let email = email.trim().to_lowercase();
        let pending = self.users.get(&email).is_some_and(|u| !u.confirmed);
        if !pending {
            // The hosted provider answers success without revealing whether
            // the address exists.
            return Ok(());
        }

        let code = self.issue_code(&email, None)?;
        record(
            &self.confirmation_emails,
            SentLink {
                email,
                redirect_to: redirect_to.to_string(),
                code,
            },
        );
        Ok(())
    }
}
