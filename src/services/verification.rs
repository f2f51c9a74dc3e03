// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "Check your inbox" notice shown after sign-up or a magic link.

use crate::error::AppError;
use crate::services::identity::IdentityProvider;
use crate::storage::{keys, ClientStorage};
use serde::Serialize;
use std::sync::Arc;

/// Minimum gap between confirmation e-mails.
pub const RESEND_COOLDOWN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationNotice {
    /// Address the e-mail went to, if known
    pub email: Option<String>,
    /// Seconds until another e-mail may be requested (0 when allowed now)
    pub resend_available_in: i64,
}

#[derive(Clone)]
pub struct VerificationService {
    identity: Arc<dyn IdentityProvider>,
    callback_url: String,
}

impl VerificationService {
    pub fn new(identity: Arc<dyn IdentityProvider>, callback_url: String) -> Self {
        Self {
            identity,
            callback_url,
        }
    }

    pub fn notice(&self, storage: &ClientStorage) -> VerificationNotice {
        self.notice_at(storage, chrono::Utc::now().timestamp())
    }

    fn notice_at(&self, storage: &ClientStorage, now: i64) -> VerificationNotice {
        let sent_at = storage
            .get_item(keys::VERIFICATION_SENT_AT)
            .and_then(|v| v.parse::<i64>().ok());
        let resend_available_in = sent_at
            .map(|sent| (sent + RESEND_COOLDOWN_SECS - now).clamp(0, RESEND_COOLDOWN_SECS))
            .unwrap_or(0);

        VerificationNotice {
            email: storage.get_item(keys::PENDING_VERIFICATION_EMAIL),
            resend_available_in,
        }
    }

    /// Send the confirmation e-mail again, honoring the cooldown.
    pub async fn resend(&self, storage: &ClientStorage) -> Result<VerificationNotice, AppError> {
        let notice = self.notice(storage);
        let email = notice
            .email
            .ok_or_else(|| AppError::BadRequest("No pending verification".to_string()))?;
        if notice.resend_available_in > 0 {
            return Err(AppError::Conflict(format!(
                "Please wait {}s before resending",
                notice.resend_available_in
            )));
        }

        self.identity
            .resend_signup_confirmation(&email, &self.callback_url)
            .await?;
        storage.set_item(
            keys::VERIFICATION_SENT_AT,
            chrono::Utc::now().timestamp().to_string(),
        );
        tracing::info!("Verification e-mail resent");

        Ok(self.notice(storage))
    }
}
