// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth_events;
pub mod bootstrap;
pub mod founders;
pub mod identity;
pub mod in_flight;
pub mod memory_identity;
pub mod profiles;
pub mod sign_in;
pub mod signup;
pub mod verification;

pub use auth_events::{spawn_profile_listener, AuthEvent, AuthEventKind, AuthEvents};
pub use bootstrap::{AuthState, CurrentUser, SessionBootstrap, SessionSource};
pub use founders::{FounderDirectory, FounderQuery};
pub use identity::{GoTrueClient, IdentityProvider, SignUpResult};
pub use in_flight::InFlight;
pub use memory_identity::MemoryIdentityProvider;
pub use profiles::{ProfileForm, ProfileService};
pub use sign_in::{SignInOutcome, SignInResolver, SignInView};
pub use signup::{SignupService, SignupStep, SignupView, SignupWizard};
pub use verification::{VerificationNotice, VerificationService};
