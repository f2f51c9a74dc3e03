// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgREST client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (one per account)
//! - User roles (what each member is looking for)
//! - Events (campus events, filterable by university)

use crate::db::{tables, DataStore};
use crate::error::AppError;
use crate::models::{Event, EventUpdate, NewEvent, NewProfile, Profile, ProfileUpdate, UserRoles};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// PostgREST database client.
#[derive(Clone)]
pub struct PostgrestDb {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Error body returned by PostgREST.
#[derive(Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestDb {
    /// Create a client for `{backend_url}/rest/v1`.
    pub fn new(backend_url: &str, anon_key: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = format!("{}/rest/v1", backend_url.trim_end_matches('/'));
        tracing::info!(url = %base_url, "Data store client initialized");

        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Start a request against a table with the API key attached.
    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Select rows matching query parameters.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response_json(response).await
    }

    /// Insert one row and return the stored representation.
    async fn insert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[body])
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut rows: Vec<T> = check_response_json(response).await?;
        if rows.is_empty() {
            return Err(AppError::Database(format!(
                "Insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Patch rows matching a filter; returns the first updated row.
    async fn update<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        filter: &[(&str, String)],
        body: &B,
    ) -> Result<Option<T>, AppError> {
        let response = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(filter)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows: Vec<T> = check_response_json(response).await?;
        Ok(rows.into_iter().next())
    }
}

/// Equality filter value, e.g. `eq.abc`.
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Membership filter value, e.g. `in.("a","b")`.
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .ok()
        .and_then(|e| match (e.message, e.details) {
            (Some(m), Some(d)) => Some(format!("{} ({})", m, d)),
            (Some(m), None) => Some(m),
            (None, d) => d,
        })
        .unwrap_or(body);

    Err(AppError::Database(format!("HTTP {}: {}", status, message)))
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
}

#[async_trait]
impl DataStore for PostgrestDb {
    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let rows: Vec<Profile> = self
            .select(
                tables::PROFILES,
                &[("user_id", eq(user_id)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        self.insert(tables::PROFILES, profile).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, AppError> {
        self.update(tables::PROFILES, &[("user_id", eq(user_id))], update)
            .await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.select(tables::PROFILES, &[]).await
    }

    async fn list_profiles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<Profile>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(tables::PROFILES, &[("user_id", in_list(user_ids))])
            .await
    }

    // ─── User Role Operations ────────────────────────────────────

    async fn founder_user_ids(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<UserRoles> = self
            .select(
                tables::USER_ROLES,
                &[(
                    "or",
                    "(founder_looking_cofounder.eq.true,founder_looking_talent.eq.true)"
                        .to_string(),
                )],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    async fn upsert_user_roles(&self, roles: &UserRoles) -> Result<(), AppError> {
        let response = self
            .request(Method::POST, tables::USER_ROLES)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "user_id")])
            .json(&[roles])
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    // ─── Event Operations ────────────────────────────────────────

    async fn list_events(&self, university: Option<&str>) -> Result<Vec<Event>, AppError> {
        let mut query = vec![("order", "start_date.asc".to_string())];
        if let Some(university) = university {
            query.push(("university", eq(university)));
        }
        self.select(tables::EVENTS, &query).await
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, AppError> {
        let rows: Vec<Event> = self
            .select(
                tables::EVENTS,
                &[("id", eq(event_id)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event, AppError> {
        self.insert(tables::EVENTS, event).await
    }

    async fn update_event(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> Result<Option<Event>, AppError> {
        self.update(tables::EVENTS, &[("id", eq(event_id))], update)
            .await
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, tables::EVENTS)
            .query(&[("id", eq(event_id))])
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }
}
