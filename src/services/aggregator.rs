// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle aggregation service.
//!
//! One poll cycle for one vehicle:
//! 1. Log in (a fresh token every cycle)
//! 2. Fetch the vehicle profile
//! 3. Fetch refuelling, service and expense histories concurrently
//! 4. Fetch the account configuration for the currency
//! 5. Fold everything into a [`VehicleSummary`]
//!
//! Only a failed login or a failed profile fetch abort the cycle. Every
//! other failure degrades that contribution to empty/none and is logged.

use serde_json::Value;

use crate::error::AppError;
use crate::models::{VehicleHistory, VehicleSummary};
use crate::services::drivvo::{AccessToken, Credentials, DrivvoClient};

/// Builds a [`VehicleSummary`] per vehicle from the Drivvo API.
#[derive(Clone)]
pub struct VehicleAggregator {
    client: DrivvoClient,
    credentials: Credentials,
}

impl VehicleAggregator {
    pub fn new(client: DrivvoClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn client(&self) -> &DrivvoClient {
        &self.client
    }

    /// Run one poll cycle for `vehicle_id`.
    ///
    /// Returns `None` when login or the profile fetch fails; the caller
    /// should treat the vehicle as unavailable until the next cycle.
    pub async fn fetch_vehicle_summary(&self, vehicle_id: &str) -> Option<VehicleSummary> {
        let token = match self.client.authenticate(&self.credentials).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(vehicle_id, error = %e, "Login failed, vehicle data unavailable");
                return None;
            }
        };

        let profile = match self.client.get_vehicle(&token, vehicle_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(vehicle_id, error = %e, "Vehicle profile fetch failed");
                return None;
            }
        };
        tracing::debug!(vehicle_id, profile = ?profile, "Vehicle profile");

        let (refuellings, services, expenses) = tokio::join!(
            self.client.get_refuellings(&token, vehicle_id),
            self.client.get_services(&token, vehicle_id),
            self.client.get_expenses(&token, vehicle_id),
        );

        let history = VehicleHistory::new(
            or_empty(refuellings, vehicle_id, "refuelling"),
            or_empty(services, vehicle_id, "service"),
            or_empty(expenses, vehicle_id, "expense"),
        );
        tracing::debug!(
            vehicle_id,
            refuellings = history.refuellings.len(),
            services = history.services.len(),
            expenses = history.expenses.len(),
            "Vehicle history fetched"
        );

        let currency = self.fetch_currency(&token).await;

        let summary = VehicleSummary::build(vehicle_id, &profile, &history, currency);
        tracing::debug!(vehicle_id, summary = ?summary, "Vehicle summary built");
        Some(summary)
    }

    /// Fetch the account currency, tolerating any failure as `None`.
    async fn fetch_currency(&self, token: &AccessToken) -> Option<String> {
        match self.client.get_configuration(token).await {
            Ok(config) => currency_from_config(&config),
            Err(AppError::MalformedResponse(e)) => {
                tracing::error!(error = %e, "Failed to parse configuration");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Configuration fetch failed");
                None
            }
        }
    }
}

/// A failed history fetch contributes an empty history.
fn or_empty<T>(result: Result<Vec<T>, AppError>, vehicle_id: &str, kind: &str) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(vehicle_id, kind, error = %e, "History fetch failed, using empty history");
            Vec::new()
        }
    }
}

/// Extract the currency code from a `/configuracao` payload.
///
/// Expects a non-empty array whose first element is an object with
/// `formato_valor`. Any other shape yields `None`.
pub fn currency_from_config(config: &Value) -> Option<String> {
    let first = match config.as_array().and_then(|items| items.first()) {
        Some(first) => first,
        None => {
            tracing::warn!(config = %config, "Configuration is not a list or is empty");
            return None;
        }
    };

    match first.as_object() {
        Some(settings) => settings
            .get("formato_valor")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => {
            tracing::warn!(config = %first, "Configuration entry is not an object");
            None
        }
    }
}
