// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (client identification, sessions, security).

pub mod auth;
pub mod client;
pub mod security;

pub use auth::{redirect_if_authenticated, require_session};
pub use client::{client_context, ClientContext};
