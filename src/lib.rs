// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drivvo-Tracker: vehicle fuel-economy sensors from the Drivvo service
//!
//! This crate logs in to Drivvo, polls each configured vehicle's refuelling,
//! service and expense history, derives fuel-economy statistics and publishes
//! them as named sensors over a small HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::IntegrationRegistry;

/// Entry id used for the integration configured from the environment.
pub const DEFAULT_ENTRY_ID: &str = "default";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub registry: IntegrationRegistry,
}
