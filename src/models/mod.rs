// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod account;
pub mod event;
pub mod profile;
pub mod roles;

pub use account::{Account, Session, SessionEnvelope};
pub use event::{Event, EventUpdate, NewEvent};
pub use profile::{split_tags, NewProfile, Profile, ProfileUpdate};
pub use roles::UserRoles;
