// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod entry;
pub mod issue;
pub mod refuelling;
pub mod sensor;
pub mod summary;
pub mod vehicle;

pub use entry::{EntryData, StoredEntry};
pub use issue::{Issue, IssueSeverity};
pub use refuelling::{
    ExpenseRecord, HistoryEntry, OdometerRecord, RefuellingRecord, ServiceRecord,
};
pub use sensor::{sensor_states, DeviceInfo, SensorState, SensorValue, SENSOR_TYPES};
pub use summary::{RefuellingStats, VehicleHistory, VehicleSummary};
pub use vehicle::{DistanceUnit, VehicleListing, VehicleProfile};
