// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use founder_connect::config::{Config, DirectAuthAccount};
use founder_connect::db::MemoryDb;
use founder_connect::routes::create_router;
use founder_connect::services::MemoryIdentityProvider;
use founder_connect::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Password used for accounts created by the helpers.
#[allow(dead_code)]
pub const PASSWORD: &str = "correct-horse-battery";

/// A test app wired to in-memory backends.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub db: Arc<MemoryDb>,
}

#[allow(dead_code)]
impl TestApp {
    /// A browser with no cookies yet.
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

/// Create a test app with the default configuration.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app whose allow-list holds `demo@chapman.edu`.
#[allow(dead_code)]
pub fn create_test_app_with_direct_auth() -> TestApp {
    let mut config = Config::test_default();
    config.direct_auth_accounts = vec![
        DirectAuthAccount {
            email: "demo@chapman.edu".to_string(),
            user_id: "demo-user".to_string(),
        },
        DirectAuthAccount {
            email: "mentor@chapman.edu".to_string(),
            user_id: "mentor-user".to_string(),
        },
    ];
    create_test_app_with_config(config)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let db = Arc::new(MemoryDb::new());
    let state = Arc::new(
        AppState::new(config, identity.clone(), db.clone()).expect("Failed to build app state"),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        identity,
        db,
    }
}

/// Issues requests as one browser, carrying its client cookie.
#[allow(dead_code)]
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

#[allow(dead_code)]
impl TestClient {
    /// The `name=value` pair of the client cookie, once issued.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// The client id inside the signed cookie.
    pub fn client_id(&self) -> String {
        let cookie = self.cookie.as_deref().expect("no client cookie issued yet");
        let value = cookie.trim_start_matches("fc_client=");
        value.rsplit_once('.').unwrap().0.to_string()
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("fc_client="))
        {
            let pair = cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str) -> Response {
        self.send(Method::POST, uri, None).await
    }

    pub async fn post_json(&mut self, uri: &str, body: serde_json::Value) -> Response {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&mut self, uri: &str, body: serde_json::Value) -> Response {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> Response {
        self.send(Method::DELETE, uri, None).await
    }

    /// Sign in with a password and assert it succeeded.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post_json(
                "/auth/signin",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        body_json(response).await
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Location` header of a redirect.
#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
