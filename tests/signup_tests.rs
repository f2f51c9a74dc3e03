// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up wizard tests.
//!
//! These tests verify that:
//! 1. Steps cannot be left with required fields missing
//! 2. Conditional steps appear only for matching answers
//! 3. Submission validates passwords and the institutional domain
//! 4. A completed sign-up creates the profile and roles and signs in

use axum::http::StatusCode;
use serde_json::json;

mod common;

fn basic_info(email: &str) -> serde_json::Value {
    json!({
        "fullName": "Ada Lovelace",
        "email": email,
        "password": common::PASSWORD,
        "confirmPassword": common::PASSWORD,
        "major": "Computer Science",
        "year": "junior",
        "interests": "AI, EdTech",
        "skills": "Rust, , Product",
    })
}

/// Walk a client to the final step with the given looking-for answers.
async fn walk_to_terms(client: &mut common::TestClient, email: &str, looking_for: serde_json::Value) {
    let view = common::body_json(client.post_json("/auth/signup/step", basic_info(email)).await).await;
    assert_eq!(view["step"], "looking-for");

    let view = common::body_json(
        client
            .post_json("/auth/signup/step", json!({ "lookingFor": looking_for }))
            .await,
    )
    .await;

    let mut step = view["step"].as_str().unwrap().to_string();
    if step == "founder-details" {
        let view = common::body_json(
            client
                .post_json(
                    "/auth/signup/step",
                    json!({
                        "founderType": "technical",
                        "startupIdea": "Peer tutoring marketplace",
                        "rolesLookingFor": "designer",
                        "founderSkills": "backend",
                        "startupStage": "idea",
                    }),
                )
                .await,
        )
        .await;
        step = view["step"].as_str().unwrap().to_string();
    }
    if step == "job-details" {
        let view = common::body_json(
            client
                .post_json(
                    "/auth/signup/step",
                    json!({ "interestedRoles": "engineering", "experience": "internship" }),
                )
                .await,
        )
        .await;
        step = view["step"].as_str().unwrap().to_string();
    }
    assert_eq!(step, "additional-questions");

    let view = common::body_json(
        client
            .post_json("/auth/signup/step", json!({ "commitment": "part-time" }))
            .await,
    )
    .await;
    assert_eq!(view["step"], "terms");
    assert_eq!(view["isFinalStep"], true);
}

#[tokio::test]
async fn test_incomplete_step_is_refused() {
    let app = common::create_test_app();
    let mut client = app.client();

    let view = common::body_json(client.get("/auth/signup").await).await;
    assert_eq!(view["step"], "basic-info");
    assert_eq!(view["stepNumber"], 1);
    assert_eq!(view["canGoBack"], false);

    let response = client
        .post_json("/auth/signup/step", json!({ "fullName": "Ada" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view = common::body_json(response).await;
    assert_eq!(view["step"], "basic-info");
    assert!(view["error"].as_str().unwrap().contains("email"));
    let missing: Vec<&str> = view["missingFields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(missing.contains(&"email"));
    assert!(!missing.contains(&"fullName"));

    // Entered values are kept
    let view = common::body_json(client.get("/auth/signup").await).await;
    assert_eq!(view["form"]["fullName"], "Ada");
}

#[tokio::test]
async fn test_conditional_steps_follow_answers() {
    let app = common::create_test_app();
    let mut client = app.client();

    client
        .post_json("/auth/signup/step", basic_info("ada@chapman.edu"))
        .await;
    let view = common::body_json(
        client
            .post_json("/auth/signup/step", json!({ "lookingFor": ["looking-job"] }))
            .await,
    )
    .await;
    assert_eq!(view["step"], "job-details");
    assert_eq!(view["totalSteps"], 5);

    let view = common::body_json(client.post("/auth/signup/back").await).await;
    assert_eq!(view["step"], "looking-for");

    // Neither conditional step applies
    let view = common::body_json(
        client
            .post_json(
                "/auth/signup/step",
                json!({ "lookingFor": ["looking-resources"] }),
            )
            .await,
    )
    .await;
    assert_eq!(view["step"], "additional-questions");
    assert_eq!(view["totalSteps"], 4);

    let view = common::body_json(client.post("/auth/signup/back").await).await;
    assert_eq!(view["step"], "looking-for");
}

#[tokio::test]
async fn test_passwords_are_not_echoed() {
    let app = common::create_test_app();
    let mut client = app.client();

    let view = common::body_json(
        client
            .post_json("/auth/signup/step", basic_info("ada@chapman.edu"))
            .await,
    )
    .await;
    assert_eq!(view["form"]["password"], "");
    assert_eq!(view["form"]["confirmPassword"], "");
    assert_eq!(view["form"]["email"], "ada@chapman.edu");
}

#[tokio::test]
async fn test_password_mismatch_is_rejected() {
    let app = common::create_test_app();
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@chapman.edu", json!(["looking-resources"])).await;

    let response = client
        .post_json(
            "/auth/signup/submit",
            json!({ "confirmPassword": "something-else", "agreeToTerms": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view = common::body_json(response).await;
    assert_eq!(view["error"], "Passwords don't match");
    assert_eq!(view["step"], "terms");
    assert_eq!(view["status"]["state"], "editing");
    assert_eq!(app.db.profile_create_count(), 0);
}

#[tokio::test]
async fn test_non_institutional_email_is_rejected() {
    let app = common::create_test_app();
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@gmail.com", json!(["looking-resources"])).await;

    let response = client
        .post_json("/auth/signup/submit", json!({ "agreeToTerms": true }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view = common::body_json(response).await;
    assert_eq!(
        view["error"],
        "Please use a Chapman University email (@chapman.edu)"
    );
}

#[tokio::test]
async fn test_late_looking_for_change_requires_new_steps() {
    let app = common::create_test_app();
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@chapman.edu", json!(["looking-resources"])).await;

    let response = client
        .post_json(
            "/auth/signup/submit",
            json!({
                "lookingFor": ["looking-job", "founder-looking-cofounder"],
                "agreeToTerms": true,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view = common::body_json(response).await;
    assert_eq!(view["step"], "founder-details");
    assert_eq!(view["status"]["state"], "editing");
    assert!(view["error"].as_str().unwrap().contains("startupIdea"));
    assert_eq!(app.db.profile_create_count(), 0);
    assert_eq!(app.identity.active_session_count(), 0);

    // The wizard was saved on the reopened step
    let view = common::body_json(client.get("/auth/signup").await).await;
    assert_eq!(view["step"], "founder-details");
}

#[tokio::test]
async fn test_terms_must_be_accepted() {
    let app = common::create_test_app();
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@chapman.edu", json!(["looking-resources"])).await;

    let response = client.post_json("/auth/signup/submit", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let view = common::body_json(response).await;
    assert!(view["error"].as_str().unwrap().contains("agreeToTerms"));
}

#[tokio::test]
async fn test_founder_sign_up_completes_and_signs_in() {
    let app = common::create_test_app();
    let mut client = app.client();
    walk_to_terms(
        &mut client,
        "ada@chapman.edu",
        json!(["founder-looking-cofounder", "looking-job"]),
    )
    .await;

    let response = client
        .post_json("/auth/signup/submit", json!({ "agreeToTerms": true }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let view = common::body_json(response).await;
    assert_eq!(view["status"]["state"], "completed");
    assert_eq!(view["status"]["redirectTo"], "/dashboard");
    assert_eq!(view["status"]["redirectAfterSecs"], 3);

    let profile = common::body_json(client.get("/api/profile").await).await;
    assert_eq!(profile["full_name"], "Ada Lovelace");
    assert_eq!(profile["bio"], "Computer Science - junior");
    assert_eq!(profile["skills"], json!(["Rust", "Product"]));
    assert_eq!(profile["interests"], json!(["AI", "EdTech"]));
    assert_eq!(app.db.profile_create_count(), 1);

    let user_id = profile["user_id"].as_str().unwrap();
    let roles = app.db.user_roles(user_id).unwrap();
    assert!(roles.founder_looking_cofounder);
    assert!(roles.looking_job);
    assert!(!roles.founder_looking_talent);

    // Signed in now, so the wizard redirects away
    let response = client.get("/auth/signup").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/dashboard");

    let founders = common::body_json(client.get("/api/founders").await).await;
    assert_eq!(founders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unconfirmed_sign_up_goes_to_verification() {
    let app = common::create_test_app();
    app.identity.set_require_confirmation(true);
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@chapman.edu", json!(["looking-resources"])).await;

    let view = common::body_json(
        client
            .post_json("/auth/signup/submit", json!({ "agreeToTerms": true }))
            .await,
    )
    .await;
    assert_eq!(view["status"]["redirectTo"], "/auth/verification");
    assert_eq!(app.identity.confirmation_emails_sent().len(), 1);

    let notice = common::body_json(client.get("/auth/verification").await).await;
    assert_eq!(notice["email"], "ada@chapman.edu");
    assert!(notice["resendAvailableIn"].as_i64().unwrap() > 0);

    let response = client.post("/auth/verification/resend").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Following the confirmation link signs the user in
    let link = app.identity.confirmation_emails_sent().remove(0);
    let response = client
        .get(&format!("/auth/callback?code={}", link.code))
        .await;
    assert_eq!(common::location(&response), "/dashboard");
    assert_eq!(client.get("/api/me").await.status(), StatusCode::OK);

    // A fresh wizard is served after completion
    client.post("/auth/signout").await;
    let view = common::body_json(client.get("/auth/signup").await).await;
    assert_eq!(view["step"], "basic-info");
    assert_eq!(view["status"]["state"], "editing");
}

#[tokio::test]
async fn test_duplicate_account_is_reported() {
    let app = common::create_test_app();
    app.identity
        .register_confirmed("ada@chapman.edu", common::PASSWORD);
    let mut client = app.client();
    walk_to_terms(&mut client, "ada@chapman.edu", json!(["looking-resources"])).await;

    let response = client
        .post_json("/auth/signup/submit", json!({ "agreeToTerms": true }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let view = common::body_json(response).await;
    assert_eq!(view["error"], "User already registered");
    assert_eq!(view["status"]["state"], "editing");
}
