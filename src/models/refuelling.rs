// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refuelling, service and expense records as returned by the Drivvo API.

use serde::{Deserialize, Serialize};

/// Anything carrying a Drivvo `data` timestamp that histories are sorted by.
pub trait Dated {
    fn date(&self) -> &str;
}

/// Sort a history newest first.
///
/// Drivvo timestamps are `YYYY-MM-DD HH:MM:SS`, so string order is date order.
/// The sort is stable: records sharing a timestamp keep their API order.
pub fn sort_newest_first<T: Dated>(records: &mut [T]) {
    records.sort_by(|a, b| b.date().cmp(a.date()));
}

/// Fuel station attached to a refuelling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuelStation {
    #[serde(default)]
    pub nome: Option<String>,
}

/// One element of `/veiculo/{id}/abastecimento/web`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefuellingRecord {
    /// Timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub data: String,
    /// Odometer reading at the pump
    pub odometro: i64,
    /// Volume filled; 0 means "derive from total and unit price"
    #[serde(default)]
    pub volume: f64,
    /// Whether the tank was filled to capacity
    #[serde(default)]
    pub tanque_cheio: bool,
    /// Unit price
    pub preco: f64,
    /// Total paid
    pub valor_total: f64,
    /// Fuel type
    #[serde(default)]
    pub combustivel: Option<String>,
    /// Reason code
    #[serde(default)]
    pub tipo_motivo: Option<String>,
    #[serde(default)]
    pub posto_combustivel: Option<FuelStation>,
}

impl RefuellingRecord {
    /// Volume to use in sums and averages.
    ///
    /// A zero volume is recomputed as total price over unit price.
    pub fn resolved_volume(&self) -> f64 {
        if self.volume != 0.0 {
            self.volume
        } else if self.preco != 0.0 {
            self.valor_total / self.preco
        } else {
            0.0
        }
    }

    /// Name of the station, when the API sent one.
    pub fn station_name(&self) -> Option<&str> {
        self.posto_combustivel
            .as_ref()
            .and_then(|station| station.nome.as_deref())
    }
}

impl Dated for RefuellingRecord {
    fn date(&self) -> &str {
        &self.data
    }
}

/// Projection of `/veiculo/{id}/servico/web` and `/veiculo/{id}/despesa/web`
/// elements; only the odometer and its date matter here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub data: String,
    /// Absent or null on some entries
    #[serde(default)]
    pub odometro: Option<i64>,
}

impl HistoryEntry {
    /// The entry as an odometer reading, if it recorded one.
    pub fn reading(&self) -> Option<OdometerRecord> {
        self.odometro.map(|odometro| OdometerRecord {
            data: self.data.clone(),
            odometro,
        })
    }
}

impl Dated for HistoryEntry {
    fn date(&self) -> &str {
        &self.data
    }
}

/// A service entry.
pub type ServiceRecord = HistoryEntry;

/// An expense entry.
pub type ExpenseRecord = HistoryEntry;

/// A dated odometer reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdometerRecord {
    pub data: String,
    pub odometro: i64,
}

impl Dated for OdometerRecord {
    fn date(&self) -> &str {
        &self.data
    }
}

impl From<&RefuellingRecord> for OdometerRecord {
    fn from(record: &RefuellingRecord) -> Self {
        Self {
            data: record.data.clone(),
            odometro: record.odometro,
        }
    }
}
