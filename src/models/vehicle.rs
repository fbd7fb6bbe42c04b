// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drivvo vehicle profile model.

use serde::{Deserialize, Deserializer, Serialize};

/// Vehicle profile from `/veiculo/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// User-chosen name (may be empty)
    #[serde(default)]
    pub nome: Option<String>,
    /// License plate (may be empty)
    #[serde(default)]
    pub placa: Option<String>,
    /// Manufacturer (empty when missing or null)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub marca: String,
    /// Model (empty when missing or null)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modelo: String,
    /// Distance unit code: 1 = km, 2 = mi
    #[serde(default)]
    pub unidade_distancia: Option<i64>,
}

impl VehicleProfile {
    /// Name, if set to something non-empty.
    pub fn name(&self) -> Option<&str> {
        non_empty(self.nome.as_deref())
    }

    /// Plate, if set to something non-empty.
    pub fn plate(&self) -> Option<&str> {
        non_empty(self.placa.as_deref())
    }

    /// Display identification: name, then plate, then `manufacturer/model`.
    pub fn identification(&self) -> String {
        self.name()
            .or_else(|| self.plate())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", self.marca, self.modelo))
    }

    pub fn distance_unit(&self) -> Option<DistanceUnit> {
        self.unidade_distancia.and_then(DistanceUnit::from_code)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Distance unit configured on the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
}

impl DistanceUnit {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Kilometers),
            2 => Some(Self::Miles),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "mi",
        }
    }
}

/// Element of `/veiculo/web`, the account's vehicle list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleListing {
    pub id: serde_json::Value,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub placa: Option<String>,
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub modelo: Option<String>,
}
