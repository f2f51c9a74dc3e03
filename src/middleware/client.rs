// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client identification middleware.
//!
//! Every browser carries a signed `fc_client` cookie (`<id>.<hex HMAC>`)
//! naming its storage namespace. Missing or tampered cookies get a fresh id.

use crate::crypto;
use crate::error::AppError;
use crate::storage::ClientStorage;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

pub const CLIENT_COOKIE: &str = "fc_client";

/// Random bytes in a client id.
const CLIENT_ID_BYTES: usize = 24;

/// The calling browser and its storage namespace.
#[derive(Clone)]
pub struct ClientContext {
    pub client_id: String,
    pub storage: ClientStorage,
}

/// Signed cookie value for a client id.
pub fn sign_client_id(client_id: &str, key: &[u8]) -> anyhow::Result<String> {
    Ok(format!("{}.{}", client_id, crypto::sign(key, client_id)?))
}

/// Client id from a cookie value, if the signature checks out.
pub fn verify_client_cookie(value: &str, key: &[u8]) -> Option<String> {
    let (client_id, signature) = value.rsplit_once('.')?;
    if client_id.is_empty() || !crypto::verify(key, client_id, signature) {
        return None;
    }
    Some(client_id.to_string())
}

/// Attach a [`ClientContext`] to the request, minting a client cookie when needed.
pub async fn client_context(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let known = jar.get(CLIENT_COOKIE).and_then(|cookie| {
        let verified = verify_client_cookie(cookie.value(), &state.cookie_key);
        if verified.is_none() {
            tracing::warn!("Client cookie signature mismatch, issuing a new client id");
        }
        verified
    });

    let (client_id, minted) = match known {
        Some(id) => (id, false),
        None => match crypto::random_token(CLIENT_ID_BYTES) {
            Ok(id) => (id, true),
            Err(e) => return AppError::Internal(e).into_response(),
        },
    };

    let storage = state.clients.storage(&client_id);
    request.extensions_mut().insert(ClientContext {
        client_id: client_id.clone(),
        storage,
    });

    let response = next.run(request).await;
    if !minted {
        return response;
    }

    let value = match sign_client_id(&client_id, &state.cookie_key) {
        Ok(value) => value,
        Err(e) => return AppError::Internal(e).into_response(),
    };
    let cookie = Cookie::build((CLIENT_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.uses_secure_cookies())
        .permanent();

    (jar.add(cookie), response).into_response()
}
