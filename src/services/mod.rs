// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - Drivvo access, aggregation and polling.

pub mod aggregator;
pub mod drivvo;
pub mod poller;
pub mod registry;

pub use aggregator::VehicleAggregator;
pub use drivvo::{AccessToken, Credentials, DrivvoClient};
pub use poller::{PollerHandle, SummaryStore, VehiclePoller};
pub use registry::{IntegrationRegistry, SetupReport};
