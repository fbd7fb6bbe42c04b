// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sensor catalogue: the named, typed values published for each vehicle.
//!
//! Each [`SensorDescription`] pairs display metadata (icon, classes, unit,
//! precision) with an accessor into [`VehicleSummary`]. [`sensor_states`]
//! resolves the whole table against one summary.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::models::summary::VehicleSummary;
use crate::time_utils::{format_utc_rfc3339, parse_drivvo_timestamp};

/// Fallback icon for sensors without their own.
pub const DEFAULT_ICON: &str = "mdi:car";

/// Manufacturer reported on every device descriptor.
pub const DEVICE_MANUFACTURER: &str = "Drivvo";

/// Identifier namespace for device descriptors.
pub const DOMAIN: &str = "drivvo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Distance,
    Timestamp,
    VolumeFlowRate,
    Monetary,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    Total,
    TotalIncreasing,
}

/// How a sensor's unit of measurement is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorUnit {
    Fixed(&'static str),
    /// The vehicle's distance unit, kilometers when unresolved
    Distance,
    /// The account currency, none when unresolved
    Currency,
}

impl SensorUnit {
    fn resolve(&self, summary: &VehicleSummary) -> Option<String> {
        match self {
            SensorUnit::Fixed(unit) => Some(unit.to_string()),
            SensorUnit::Distance => Some(
                summary
                    .distance_unit
                    .map(|unit| unit.symbol())
                    .unwrap_or(UNIT_KILOMETERS)
                    .to_string(),
            ),
            SensorUnit::Currency => summary.currency.clone(),
        }
    }
}

pub const UNIT_KILOMETERS: &str = "km";
pub const UNIT_KILOMETERS_PER_LITER: &str = "km/L";
pub const UNIT_LITERS: &str = "L";

/// A sensor's current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Flag(bool),
    #[serde(serialize_with = "serialize_timestamp")]
    Timestamp(DateTime<Utc>),
    Unknown,
}

fn serialize_timestamp<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_utc_rfc3339(*date))
}

impl SensorValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SensorValue::Unknown)
    }
}

impl From<Option<i64>> for SensorValue {
    fn from(value: Option<i64>) -> Self {
        value.map(SensorValue::Integer).unwrap_or(SensorValue::Unknown)
    }
}

impl From<Option<f64>> for SensorValue {
    fn from(value: Option<f64>) -> Self {
        value.map(SensorValue::Float).unwrap_or(SensorValue::Unknown)
    }
}

impl From<Option<bool>> for SensorValue {
    fn from(value: Option<bool>) -> Self {
        value.map(SensorValue::Flag).unwrap_or(SensorValue::Unknown)
    }
}

impl From<Option<&String>> for SensorValue {
    fn from(value: Option<&String>) -> Self {
        value
            .map(|v| SensorValue::Text(v.clone()))
            .unwrap_or(SensorValue::Unknown)
    }
}

/// Static description of one sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub unit: Option<SensorUnit>,
    pub display_precision: Option<u8>,
    pub value_fn: fn(&VehicleSummary) -> SensorValue,
}

impl SensorDescription {
    const fn new(
        key: &'static str,
        name: &'static str,
        icon: &'static str,
        value_fn: fn(&VehicleSummary) -> SensorValue,
    ) -> Self {
        Self {
            key,
            name,
            icon: Some(icon),
            device_class: None,
            state_class: None,
            unit: None,
            display_precision: None,
            value_fn,
        }
    }

    const fn device_class(mut self, device_class: DeviceClass) -> Self {
        self.device_class = Some(device_class);
        self
    }

    const fn state_class(mut self, state_class: StateClass) -> Self {
        self.state_class = Some(state_class);
        self
    }

    const fn unit(mut self, unit: SensorUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn precision(mut self, digits: u8) -> Self {
        self.display_precision = Some(digits);
        self
    }

    /// Resolve this sensor against a summary.
    pub fn state(&self, summary: &VehicleSummary) -> SensorState {
        let mut value = (self.value_fn)(summary);

        if self.device_class == Some(DeviceClass::Timestamp) {
            if let SensorValue::Text(raw) = &value {
                value = match parse_drivvo_timestamp(raw) {
                    Some(timestamp) => SensorValue::Timestamp(timestamp),
                    None => {
                        tracing::error!(
                            sensor = self.key,
                            value = %raw,
                            "Error parsing timestamp"
                        );
                        SensorValue::Unknown
                    }
                };
            }
        }

        SensorState {
            unique_id: format!("{}_{}", summary.id, self.key),
            key: self.key,
            name: self.name,
            icon: self.icon.unwrap_or(DEFAULT_ICON),
            device_class: self.device_class,
            state_class: self.state_class,
            unit: self.unit.and_then(|unit| unit.resolve(summary)),
            display_precision: self.display_precision,
            value,
        }
    }
}

/// A resolved sensor, ready to publish.
#[derive(Debug, Clone, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_precision: Option<u8>,
    pub value: SensorValue,
}

/// Every sensor published per vehicle.
pub static SENSOR_TYPES: &[SensorDescription] = &[
    SensorDescription::new("refuelling_total", "Refuelling Total", "mdi:counter", |s| {
        SensorValue::Integer(s.refuelling.refuelling_total as i64)
    })
    .state_class(StateClass::Total),
    SensorDescription::new("vehicle", "Vehicle", "mdi:car", |s| {
        Some(&s.model).filter(|model| !model.is_empty()).into()
    }),
    SensorDescription::new("odometer", "Odometer", "mdi:speedometer", |s| {
        s.odometer.into()
    })
    .device_class(DeviceClass::Distance)
    .state_class(StateClass::TotalIncreasing)
    .unit(SensorUnit::Distance),
    SensorDescription::new("odometer_date", "Odometer Date", "mdi:calendar", |s| {
        s.odometer_date.as_ref().into()
    })
    .device_class(DeviceClass::Timestamp),
    SensorDescription::new(
        "refuelling_last_average",
        "Refuelling Last Average",
        "mdi:fuel",
        |s| s.refuelling.refuelling_last_average.into(),
    )
    .device_class(DeviceClass::VolumeFlowRate)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Fixed(UNIT_KILOMETERS_PER_LITER))
    .precision(2),
    SensorDescription::new(
        "refuelling_general_average",
        "Refuelling General Average",
        "mdi:fuel",
        |s| s.refuelling.refuelling_general_average.into(),
    )
    .device_class(DeviceClass::VolumeFlowRate)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Fixed(UNIT_KILOMETERS_PER_LITER))
    .precision(2),
    SensorDescription::new(
        "refuelling_station",
        "Refuelling Station",
        "mdi:gas-station",
        |s| s.refuelling.refuelling_station.as_ref().into(),
    ),
    SensorDescription::new("refuelling_type", "Refuelling Type", "mdi:gas-station", |s| {
        s.refuelling.refuelling_type.as_ref().into()
    }),
    SensorDescription::new(
        "refuelling_reason",
        "Refuelling Reason",
        "mdi:information-outline",
        |s| s.refuelling.refuelling_reason.as_ref().into(),
    ),
    SensorDescription::new("refuelling_date", "Refuelling Date", "mdi:calendar", |s| {
        s.refuelling.refuelling_date.as_ref().into()
    })
    .device_class(DeviceClass::Timestamp),
    SensorDescription::new("refuelling_value", "Refuelling Value", "mdi:cash", |s| {
        s.refuelling.refuelling_value.into()
    })
    .device_class(DeviceClass::Monetary)
    .state_class(StateClass::Total)
    .unit(SensorUnit::Currency)
    .precision(2),
    SensorDescription::new("refuelling_price", "Refuelling Price", "mdi:cash", |s| {
        s.refuelling.refuelling_price.into()
    })
    .device_class(DeviceClass::Monetary)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Currency)
    .precision(2),
    SensorDescription::new(
        "refuelling_value_total",
        "Refuelling Value Total",
        "mdi:cash",
        |s| s.refuelling.refuelling_value_total.into(),
    )
    .device_class(DeviceClass::Monetary)
    .state_class(StateClass::Total)
    .unit(SensorUnit::Currency)
    .precision(2),
    SensorDescription::new(
        "refuelling_tank_full",
        "Refuelling Tank Full",
        "mdi:gas-station",
        |s| s.refuelling.refuelling_tank_full.into(),
    ),
    SensorDescription::new("refuelling_distance", "Refuelling Distance", "mdi:road", |s| {
        s.refuelling.refuelling_distance.into()
    })
    .device_class(DeviceClass::Distance)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Distance),
    SensorDescription::new(
        "refuelling_price_lowest",
        "Refuelling Price Lowest",
        "mdi:cash",
        |s| s.refuelling.refuelling_price_lowest.into(),
    )
    .device_class(DeviceClass::Monetary)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Currency)
    .precision(2),
    SensorDescription::new("refuelling_volume", "Refuelling Volume", "mdi:fuel", |s| {
        s.refuelling.refuelling_volume.into()
    })
    .device_class(DeviceClass::Volume)
    .state_class(StateClass::Measurement)
    .unit(SensorUnit::Fixed(UNIT_LITERS))
    .precision(2),
    SensorDescription::new(
        "refuelling_volume_total",
        "Refuelling Volume Total",
        "mdi:fuel",
        |s| s.refuelling.refuelling_volume_total.into(),
    )
    .device_class(DeviceClass::Volume)
    .state_class(StateClass::Total)
    .unit(SensorUnit::Fixed(UNIT_LITERS))
    .precision(2),
];

/// Resolve every sensor in [`SENSOR_TYPES`] for one vehicle.
pub fn sensor_states(summary: &VehicleSummary) -> Vec<SensorState> {
    SENSOR_TYPES
        .iter()
        .map(|description| description.state(summary))
        .collect()
}

/// Device descriptor grouping a vehicle's sensors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: String,
    pub sw_version: &'static str,
    pub entry_type: &'static str,
}

impl DeviceInfo {
    pub fn for_vehicle(summary: &VehicleSummary) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), summary.id.clone())],
            name: summary.identification.clone(),
            manufacturer: DEVICE_MANUFACTURER,
            model: format!("{} {}", summary.manufacturer, summary.model)
                .trim()
                .to_string(),
            sw_version: env!("CARGO_PKG_VERSION"),
            entry_type: "service",
        }
    }
}
