// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FounderConnect: campus startup networking backend
//!
//! This crate provides the backend-for-frontend API that signs students in,
//! walks them through registration and serves profiles, founders and events
//! from a hosted identity provider and data store.

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use db::DataStore;
use services::{
    AuthEvents, FounderDirectory, IdentityProvider, InFlight, ProfileService, SessionBootstrap,
    SignInResolver, SignupService, VerificationService,
};
use std::sync::Arc;
use storage::ClientStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub db: Arc<dyn DataStore>,
    pub clients: ClientStore,
    /// MAC key for client cookies
    pub cookie_key: Vec<u8>,
    pub events: AuthEvents,
    pub profiles: ProfileService,
    pub bootstrap: SessionBootstrap,
    pub sign_in: SignInResolver,
    pub signup: SignupService,
    pub verification: VerificationService,
    pub founders: FounderDirectory,
    pub in_flight: InFlight,
}

impl AppState {
    /// Wire services over the given backends.
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        db: Arc<dyn DataStore>,
    ) -> anyhow::Result<Self> {
        let cookie_key = crypto::derive_key(&config.session_signing_key, crypto::COOKIE_KEY_INFO)?;
        let token_key = crypto::derive_key(&config.session_signing_key, crypto::TOKEN_KEY_INFO)?;

        let events = AuthEvents::new();
        let profiles = ProfileService::new(db.clone(), config.university.clone());
        let bootstrap = SessionBootstrap::new(
            identity.clone(),
            profiles.clone(),
            events.clone(),
            token_key.clone(),
        );
        let sign_in = SignInResolver::new(&config, identity.clone(), events.clone(), token_key);
        let signup = SignupService::new(
            &config,
            identity.clone(),
            db.clone(),
            profiles.clone(),
            events.clone(),
        );
        let verification = VerificationService::new(identity.clone(), config.callback_url());
        let founders = FounderDirectory::new(db.clone());

        Ok(Self {
            config,
            identity,
            db,
            clients: ClientStore::new(),
            cookie_key,
            events,
            profiles,
            bootstrap,
            sign_in,
            signup,
            verification,
            founders,
            in_flight: InFlight::new(),
        })
    }
}
