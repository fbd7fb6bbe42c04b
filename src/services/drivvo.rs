// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drivvo API client.
//!
//! Handles:
//! - Login with the MD5-hashed password the service expects
//! - Vehicle profile, refuelling, service and expense history reads
//! - Account configuration (currency) reads
//!
//! Every request carries the browser header set from [`default_headers`];
//! the service rejects requests that do not look like its web client.

use std::time::Duration;

use anyhow::Context;
use md5::{Digest, Md5};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{
    ExpenseRecord, RefuellingRecord, ServiceRecord, VehicleListing, VehicleProfile,
};

/// Per-request timeout for Drivvo calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the session token on API reads.
pub const TOKEN_HEADER: &str = "x-token";

/// Browser header set sent on every Drivvo request, in wire order.
///
/// Names are lowercase as `http` stores them; the client writes them
/// title-cased on HTTP/1 (`Sec-Ch-Ua`, `User-Agent`, ...) like a browser.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-encoding", "gzip, deflate, br, zstd"),
    ("accept-language", "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("app-platform", "HA-Drivvo"),
    ("app-version", "1"),
    ("cache-control", "no-cache"),
    ("content-type", "application/json"),
    ("dnt", "1"),
    ("origin", "https://web.drivvo.com"),
    ("pragma", "no-cache"),
    ("priority", "u=1, i"),
    ("referer", "https://web.drivvo.com/"),
    (
        "sec-ch-ua",
        "\"Chromium\";v=\"140\", \"Not-A?Brand\";v=\"24\", \"Microsoft Edge\";v=\"140\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"macOS\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    (
        "user-agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36 Edg/140.0.0.0",
    ),
];

/// Build the Drivvo header map.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(DEFAULT_HEADERS.len() + 1);
    for &(name, value) in DEFAULT_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Hash a password the way the Drivvo login endpoint expects.
///
/// Unsalted MD5 as lowercase hex. This is wire compatibility, not protection:
/// anyone who sees the request can replay the digest.
pub fn hash_password(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

/// Account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Short-lived session token from the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Drivvo API client.
#[derive(Clone)]
pub struct DrivvoClient {
    http: reqwest::Client,
    login_url: String,
    base_url: String,
}

impl DrivvoClient {
    /// Create a client for the given login endpoint and API base URL.
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(
        login_url: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .http1_title_case_headers()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Drivvo HTTP client")?;

        Ok(Self {
            http,
            login_url: login_url.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in and return a session token.
    ///
    /// Any transport error, non-2xx status or body without a token is
    /// [`AppError::AuthenticationFailed`]. There is no retry here; callers
    /// poll again on their own schedule.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, AppError> {
        let body = LoginRequest {
            email: &credentials.email,
            senha: hash_password(&credentials.password),
        };

        let response = self
            .http
            .post(&self.login_url)
            .headers(default_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Drivvo login request failed");
                AppError::AuthenticationFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Drivvo login rejected");
            return Err(AppError::AuthenticationFailed);
        }

        let login: LoginResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Drivvo login response had no token");
            AppError::AuthenticationFailed
        })?;

        Ok(AccessToken(login.token))
    }

    /// List the account's vehicles.
    pub async fn list_vehicles(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<VehicleListing>, AppError> {
        let url = format!("{}/veiculo/web", self.base_url);
        self.get_json(&url, token).await
    }

    /// Get a vehicle profile by ID.
    pub async fn get_vehicle(
        &self,
        token: &AccessToken,
        vehicle_id: &str,
    ) -> Result<VehicleProfile, AppError> {
        let url = format!("{}/veiculo/{}", self.base_url, vehicle_id);
        self.get_json(&url, token).await
    }

    /// Get a vehicle's refuelling history (unsorted).
    pub async fn get_refuellings(
        &self,
        token: &AccessToken,
        vehicle_id: &str,
    ) -> Result<Vec<RefuellingRecord>, AppError> {
        let url = format!("{}/veiculo/{}/abastecimento/web", self.base_url, vehicle_id);
        self.get_json(&url, token).await
    }

    /// Get a vehicle's service history (unsorted).
    pub async fn get_services(
        &self,
        token: &AccessToken,
        vehicle_id: &str,
    ) -> Result<Vec<ServiceRecord>, AppError> {
        let url = format!("{}/veiculo/{}/servico/web", self.base_url, vehicle_id);
        self.get_json(&url, token).await
    }

    /// Get a vehicle's expense history (unsorted).
    pub async fn get_expenses(
        &self,
        token: &AccessToken,
        vehicle_id: &str,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        let url = format!("{}/veiculo/{}/despesa/web", self.base_url, vehicle_id);
        self.get_json(&url, token).await
    }

    /// Get the raw account configuration.
    ///
    /// Returned untyped: its shape is not reliable and callers inspect it.
    pub async fn get_configuration(
        &self,
        token: &AccessToken,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/configuracao", self.base_url);
        self.get_json(&url, token).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        token: &AccessToken,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .headers(default_headers())
            .header(TOKEN_HEADER, token.as_str())
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FetchFailed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("JSON parse error: {}", e)))
    }
}
