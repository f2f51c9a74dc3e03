// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! What a member is looking for, stored in the `user_roles` table.

use serde::{Deserialize, Serialize};

/// One row per account in `user_roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoles {
    pub user_id: String,
    #[serde(default)]
    pub founder_looking_cofounder: bool,
    #[serde(default)]
    pub founder_looking_talent: bool,
    #[serde(default)]
    pub looking_job: bool,
    #[serde(default)]
    pub looking_resources: bool,
}

impl UserRoles {
    /// Founders are listed in the co-founder directory.
    pub fn is_founder(&self) -> bool {
        self.founder_looking_cofounder || self.founder_looking_talent
    }
}
