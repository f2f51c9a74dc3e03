// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session bootstrap tests.
//!
//! These tests verify that:
//! 1. Concurrent first requests provision exactly one profile
//! 2. Sign-out leaves the client anonymous and revokes the provider session
//! 3. Corrupt, expired or forged direct-auth envelopes are discarded
//! 4. Provider sessions are refreshed near expiry and survive outages

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use founder_connect::middleware::auth::create_direct_token;
use founder_connect::models::{Session, SessionEnvelope};
use founder_connect::storage::keys;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_concurrent_bootstraps_create_one_profile() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    let mut client = app.client();
    client.sign_in("ada@chapman.edu", common::PASSWORD).await;
    let cookie = client.cookie().unwrap().to_string();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = app.router.clone();
        let cookie = cookie.clone();
        handles.push(tokio::spawn(async move {
            router
                .oneshot(
                    Request::builder()
                        .uri("/api/me")
                        .header(header::COOKIE, cookie)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap()
                .status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(app.db.profile_create_count(), 1);
}

#[tokio::test]
async fn test_placeholder_profile_is_retried() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    app.db.set_fail_profile_writes(true);
    let mut client = app.client();
    client.sign_in("ada@chapman.edu", common::PASSWORD).await;

    let me = common::body_json(client.get("/api/me").await).await;
    assert_eq!(me["profilePending"], true);
    assert!(me["profile"]["id"].as_str().unwrap().starts_with("local-"));

    app.db.set_fail_profile_writes(false);
    let me = common::body_json(client.get("/api/me").await).await;
    assert_eq!(me["profilePending"], false);
    assert_eq!(app.db.profile_create_count(), 1);
}

#[tokio::test]
async fn test_sign_out_goes_anonymous() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    let mut client = app.client();
    client.sign_in("ada@chapman.edu", common::PASSWORD).await;
    assert_eq!(app.identity.active_session_count(), 1);

    let response = client.post("/auth/signout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/");
    assert_eq!(app.identity.active_session_count(), 0);

    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let landing = common::body_json(client.get("/").await).await;
    assert_eq!(landing["authenticated"], false);
}

#[tokio::test]
async fn test_sign_out_direct_auth() {
    let app = common::create_test_app_with_direct_auth();
    let mut client = app.client();
    client.sign_in("demo@chapman.edu", "").await;

    client.post("/auth/signout").await;

    let storage = app.state.clients.storage(&client.client_id());
    assert!(storage.get_item(keys::SESSION_ENVELOPE).is_none());
    assert_eq!(
        client.get("/api/me").await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_corrupt_envelope_is_discarded() {
    let app = common::create_test_app();
    let mut client = app.client();
    client.get("/").await;

    let storage = app.state.clients.storage(&client.client_id());
    storage.set_item(keys::SESSION_ENVELOPE, "{not json");

    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(storage.get_item(keys::SESSION_ENVELOPE).is_none());
}

#[tokio::test]
async fn test_expired_envelope_is_discarded() {
    let app = common::create_test_app_with_direct_auth();
    let mut client = app.client();
    client.sign_in("demo@chapman.edu", "").await;

    let storage = app.state.clients.storage(&client.client_id());
    let mut envelope: SessionEnvelope = storage
        .get_json(keys::SESSION_ENVELOPE)
        .unwrap()
        .unwrap();
    envelope.expires_at = chrono::Utc::now().timestamp() - 1;
    storage
        .set_json(keys::SESSION_ENVELOPE, &envelope)
        .unwrap();

    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(storage.get_item(keys::SESSION_ENVELOPE).is_none());
}

#[tokio::test]
async fn test_forged_envelope_is_rejected() {
    let app = common::create_test_app();
    let mut client = app.client();
    client.get("/").await;

    let user = founder_connect::models::Account {
        id: "someone-else".to_string(),
        email: "someone@chapman.edu".to_string(),
    };
    let expires_at = chrono::Utc::now().timestamp() + 3600;
    let envelope = SessionEnvelope {
        current_session: Session {
            access_token: create_direct_token(&user, expires_at, b"not_the_server_key").unwrap(),
            refresh_token: "direct-auth".to_string(),
            token_type: "bearer".to_string(),
            expires_at,
            user,
        },
        expires_at,
    };
    let storage = app.state.clients.storage(&client.client_id());
    storage
        .set_json(keys::SESSION_ENVELOPE, &envelope)
        .unwrap();

    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(storage.get_item(keys::SESSION_ENVELOPE).is_none());
}

#[tokio::test]
async fn test_session_near_expiry_is_refreshed() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    app.identity.set_session_ttl_secs(30);
    let mut client = app.client();
    client.sign_in("ada@chapman.edu", common::PASSWORD).await;

    let storage = app.state.clients.storage(&client.client_id());
    let before: Session = storage.get_json(keys::PROVIDER_SESSION).unwrap().unwrap();

    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::OK);

    let after: Session = storage.get_json(keys::PROVIDER_SESSION).unwrap().unwrap();
    assert_ne!(before.access_token, after.access_token);
    assert_eq!(before.user, after.user);
}

#[tokio::test]
async fn test_provider_outage_keeps_session() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    let mut client = app.client();
    client.sign_in("ada@chapman.edu", common::PASSWORD).await;

    app.identity.set_unavailable(true);
    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let storage = app.state.clients.storage(&client.client_id());
    assert!(storage.get_item(keys::PROVIDER_SESSION).is_some());

    app.identity.set_unavailable(false);
    let response = client.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signed_in_event_provisions_profile() {
    let app = common::create_test_app();
    let listener = founder_connect::services::spawn_profile_listener(
        &app.state.events,
        app.state.profiles.clone(),
    );
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    let mut client = app.client();
    let body = client.sign_in("ada@chapman.edu", common::PASSWORD).await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // The listener runs in the background
    for _ in 0..50 {
        if app.state.profiles.cached(&user_id).is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(app.state.profiles.cached(&user_id).is_some());
    assert_eq!(app.db.profile_create_count(), 1);

    listener.abort();
}
