// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client single-flight guard for form submissions.

use crate::error::AppError;
use dashmap::DashSet;
use std::sync::Arc;

/// Tracks which (client, action) pairs have a submission outstanding.
#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<DashSet<(String, &'static str)>>,
}

/// Releases the slot when dropped.
pub struct InFlightGuard {
    active: Arc<DashSet<(String, &'static str)>>,
    key: (String, &'static str),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `action` for a client; `409 Conflict` while one is outstanding.
    pub fn begin(&self, client_id: &str, action: &'static str) -> Result<InFlightGuard, AppError> {
        let key = (client_id.to_string(), action);
        if !self.active.insert(key.clone()) {
            tracing::debug!(action, "Rejecting overlapping submission");
            return Err(AppError::Conflict(format!("{} already in progress", action)));
        }
        Ok(InFlightGuard {
            active: self.active.clone(),
            key,
        })
    }
}
