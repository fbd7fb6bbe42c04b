// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes exposing published vehicle data.

use crate::error::{AppError, Result};
use crate::models::{
    sensor_states, DeviceInfo, Issue, SensorState, VehicleListing, VehicleSummary,
};
use crate::services::Credentials;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/{id}", get(get_vehicle))
        .route("/api/vehicles/{id}/sensors", get(get_vehicle_sensors))
        .route("/api/issues", get(list_issues))
        .route("/api/account/vehicles", get(list_account_vehicles))
}

// ─── Vehicles ────────────────────────────────────────────────

/// Latest summary of every available vehicle.
async fn list_vehicles(State(state): State<Arc<AppState>>) -> Json<Vec<VehicleSummary>> {
    Json(state.registry.summaries())
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VehicleSummary>> {
    state
        .registry
        .summary(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} unavailable", id)))
}

// ─── Sensors ─────────────────────────────────────────────────

/// Sensors of one vehicle, grouped under its device.
#[derive(Serialize)]
pub struct VehicleSensorsResponse {
    pub device: DeviceInfo,
    pub sensors: Vec<SensorState>,
}

async fn get_vehicle_sensors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VehicleSensorsResponse>> {
    let summary = state
        .registry
        .summary(&id)
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} unavailable", id)))?;

    Ok(Json(VehicleSensorsResponse {
        device: DeviceInfo::for_vehicle(&summary),
        sensors: sensor_states(&summary),
    }))
}

// ─── Issues ──────────────────────────────────────────────────

async fn list_issues(State(state): State<Arc<AppState>>) -> Json<Vec<Issue>> {
    Json(state.registry.issues())
}

// ─── Account ─────────────────────────────────────────────────

/// Vehicles on the Drivvo account, to help pick ids to configure.
///
/// Logs in on every call; nothing is cached.
async fn list_account_vehicles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VehicleListing>>> {
    let entry = &state.config.entry;
    let credentials = Credentials::new(entry.email.clone(), entry.password.clone());

    let client = state.registry.client();
    let token = client.authenticate(&credentials).await?;
    let vehicles = client.list_vehicles(&token).await?;

    tracing::debug!(count = vehicles.len(), "Account vehicles listed");
    Ok(Json(vehicles))
}
