// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-vehicle summary derived from one poll cycle.
//!
//! Everything here is pure: the aggregator fetches, this module folds.
//! Summaries are rebuilt from scratch on every cycle; nothing carries over
//! except the vehicle id the summary is keyed by.

use serde::{Deserialize, Serialize};

use crate::models::refuelling::{
    sort_newest_first, ExpenseRecord, HistoryEntry, OdometerRecord, RefuellingRecord,
    ServiceRecord,
};
use crate::models::vehicle::{DistanceUnit, VehicleProfile};

/// Histories fetched for one vehicle, each sorted newest first.
#[derive(Debug, Clone, Default)]
pub struct VehicleHistory {
    pub refuellings: Vec<RefuellingRecord>,
    pub services: Vec<ServiceRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

impl VehicleHistory {
    /// Build a history, sorting every collection newest first.
    pub fn new(
        mut refuellings: Vec<RefuellingRecord>,
        mut services: Vec<ServiceRecord>,
        mut expenses: Vec<ExpenseRecord>,
    ) -> Self {
        sort_newest_first(&mut refuellings);
        sort_newest_first(&mut services);
        sort_newest_first(&mut expenses);
        Self {
            refuellings,
            services,
            expenses,
        }
    }

    /// Most recent odometer reading across refuellings, services and expenses.
    ///
    /// Service and expense entries without an odometer are skipped.
    pub fn latest_odometer(&self) -> Option<OdometerRecord> {
        let mut readings: Vec<OdometerRecord> = self
            .refuellings
            .iter()
            .map(OdometerRecord::from)
            .chain(self.services.iter().filter_map(HistoryEntry::reading))
            .chain(self.expenses.iter().filter_map(HistoryEntry::reading))
            .collect();

        sort_newest_first(&mut readings);
        readings.into_iter().next()
    }
}

/// Refuelling statistics.
///
/// With no refuellings the total is 0 and every other field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefuellingStats {
    // ─── Latest refuelling ───────────────────────────────────────
    pub refuelling_date: Option<String>,
    pub refuelling_odometer: Option<i64>,
    pub refuelling_station: Option<String>,
    pub refuelling_type: Option<String>,
    pub refuelling_value: Option<f64>,
    pub refuelling_price: Option<f64>,
    /// Resolved volume of the latest refuelling
    pub refuelling_volume: Option<f64>,
    pub refuelling_reason: Option<String>,
    pub refuelling_tank_full: Option<bool>,

    // ─── Lifetime ────────────────────────────────────────────────
    /// Odometer delta between the two latest refuellings
    pub refuelling_distance: Option<i64>,
    pub refuelling_total: usize,
    pub refuelling_value_total: Option<f64>,
    pub refuelling_volume_total: Option<f64>,
    pub refuelling_price_lowest: Option<f64>,

    // ─── Efficiency (distance per volume) ────────────────────────
    /// Average over the last full-tank-to-full-tank window
    pub refuelling_last_average: Option<f64>,
    /// Average over the whole history
    pub refuelling_general_average: Option<f64>,
}

impl RefuellingStats {
    /// Fold a refuelling history. `history` must be sorted newest first.
    pub fn from_history(history: &[RefuellingRecord]) -> Self {
        let Some(latest) = history.first() else {
            return Self::default();
        };

        let value_total: f64 = history.iter().map(|r| r.valor_total).sum();
        let volume_total: f64 = history.iter().map(RefuellingRecord::resolved_volume).sum();
        let price_lowest = history
            .iter()
            .map(|r| r.preco)
            .fold(f64::INFINITY, f64::min);

        let (distance, general_average, last_average) = match history {
            [newest, second, ..] => {
                let oldest = &history[history.len() - 1];
                let general_average = if volume_total > 0.0 {
                    (newest.odometro - oldest.odometro) as f64 / volume_total
                } else {
                    0.0
                };
                (
                    newest.odometro - second.odometro,
                    Some(general_average),
                    Some(last_tank_average(history)),
                )
            }
            _ => (0, None, None),
        };

        Self {
            refuelling_date: Some(latest.data.clone()),
            refuelling_odometer: Some(latest.odometro),
            refuelling_station: latest.station_name().map(str::to_string),
            refuelling_type: latest.combustivel.clone(),
            refuelling_value: Some(latest.valor_total),
            refuelling_price: Some(latest.preco),
            refuelling_volume: Some(latest.resolved_volume()),
            refuelling_reason: latest.tipo_motivo.clone(),
            refuelling_tank_full: Some(latest.tanque_cheio),
            refuelling_distance: Some(distance),
            refuelling_total: history.len(),
            refuelling_value_total: Some(value_total),
            refuelling_volume_total: Some(volume_total),
            refuelling_price_lowest: Some(price_lowest),
            refuelling_last_average: last_average,
            refuelling_general_average: general_average,
        }
    }
}

/// Efficiency since the last full-tank-to-full-tank cycle.
///
/// Walks newest to oldest. The first tank-full record opens the window and
/// the next tank-full record at a different odometer closes it; volumes are
/// accumulated from the opening record up to (not including) the closing one.
/// Returns 0 when the window never closes or holds no volume.
pub fn last_tank_average(history: &[RefuellingRecord]) -> f64 {
    let mut start: Option<i64> = None;
    let mut end: Option<i64> = None;
    let mut volume = 0.0;

    for record in history {
        if record.tanque_cheio && start.is_none() {
            start = Some(record.odometro);
        }

        let Some(start_odometer) = start else {
            continue;
        };

        if record.tanque_cheio && record.odometro != start_odometer {
            end = Some(record.odometro);
            break;
        }

        volume += record.resolved_volume();
    }

    match (start, end) {
        (Some(start), Some(end)) if volume > 0.0 => (start - end) as f64 / volume,
        _ => 0.0,
    }
}

/// Everything published for one vehicle after a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: String,
    pub name: Option<String>,
    pub identification: String,
    pub plate: Option<String>,
    pub manufacturer: String,
    pub model: String,
    pub distance_unit: Option<DistanceUnit>,
    /// Most recent odometer across refuellings, services and expenses
    pub odometer: Option<i64>,
    pub odometer_date: Option<String>,
    #[serde(flatten)]
    pub refuelling: RefuellingStats,
    /// Currency code from the account configuration
    pub currency: Option<String>,
}

impl VehicleSummary {
    pub fn build(
        vehicle_id: &str,
        profile: &VehicleProfile,
        history: &VehicleHistory,
        currency: Option<String>,
    ) -> Self {
        let latest_odometer = history.latest_odometer();

        Self {
            id: vehicle_id.to_string(),
            name: profile.name().map(str::to_string),
            identification: profile.identification(),
            plate: profile.plate().map(str::to_string),
            manufacturer: profile.marca.clone(),
            model: profile.modelo.clone(),
            distance_unit: profile.distance_unit(),
            odometer: latest_odometer.as_ref().map(|r| r.odometro),
            odometer_date: latest_odometer.map(|r| r.data),
            refuelling: RefuellingStats::from_history(&history.refuellings),
            currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refuelling(data: &str, odometro: i64, volume: f64, tanque_cheio: bool) -> RefuellingRecord {
        RefuellingRecord {
            data: data.to_string(),
            odometro,
            volume,
            tanque_cheio,
            preco: 5.0,
            valor_total: volume * 5.0,
            combustivel: Some("Gasolina".to_string()),
            tipo_motivo: Some("Rotina".to_string()),
            posto_combustivel: None,
        }
    }

    fn three_full_tanks() -> Vec<RefuellingRecord> {
        vec![
            refuelling("2024-03-01 10:00:00", 30000, 20.0, true),
            refuelling("2024-02-01 10:00:00", 20000, 15.0, true),
            refuelling("2024-01-01 10:00:00", 10000, 10.0, true),
        ]
    }

    fn odometer(data: &str, odometro: i64) -> HistoryEntry {
        HistoryEntry {
            data: data.to_string(),
            odometro: Some(odometro),
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = RefuellingStats::from_history(&[]);

        assert_eq!(stats.refuelling_total, 0);
        assert_eq!(stats, RefuellingStats::default());
        assert!(stats.refuelling_general_average.is_none());
        assert!(stats.refuelling_last_average.is_none());
    }

    #[test]
    fn test_three_full_tanks() {
        let stats = RefuellingStats::from_history(&three_full_tanks());

        assert_eq!(stats.refuelling_total, 3);
        assert_eq!(stats.refuelling_distance, Some(10000));
        assert_eq!(stats.refuelling_volume_total, Some(45.0));
        assert_eq!(stats.refuelling_value_total, Some(225.0));

        let general = stats.refuelling_general_average.unwrap();
        assert!((general - 20000.0 / 45.0).abs() < 1e-9);

        assert_eq!(stats.refuelling_last_average, Some(500.0));
    }

    #[test]
    fn test_last_average_newest_and_middle_full() {
        let mut history = three_full_tanks();
        history[2].tanque_cheio = false;

        assert_eq!(last_tank_average(&history), 500.0);
    }

    #[test]
    fn test_last_average_single_full_tank_falls_back_to_zero() {
        let history = vec![
            refuelling("2024-03-01 10:00:00", 30000, 20.0, true),
            refuelling("2024-02-01 10:00:00", 20000, 15.0, false),
            refuelling("2024-01-01 10:00:00", 10000, 10.0, false),
        ];

        assert_eq!(last_tank_average(&history), 0.0);
    }

    #[test]
    fn test_last_average_window_starts_at_first_full_tank() {
        let history = vec![
            refuelling("2024-04-01 10:00:00", 30000, 20.0, false),
            refuelling("2024-03-01 10:00:00", 25000, 15.0, true),
            refuelling("2024-02-01 10:00:00", 20000, 10.0, false),
            refuelling("2024-01-01 10:00:00", 15000, 12.0, true),
        ];

        // (25000 - 15000) / (15 + 10)
        assert_eq!(last_tank_average(&history), 400.0);
    }

    #[test]
    fn test_last_average_skips_full_tank_at_same_odometer() {
        let history = vec![
            refuelling("2024-03-02 10:00:00", 30000, 5.0, true),
            refuelling("2024-03-01 10:00:00", 30000, 15.0, true),
            refuelling("2024-02-01 10:00:00", 20000, 10.0, true),
        ];

        // Both records at 30000 belong to the window: 10000 / 20
        assert_eq!(last_tank_average(&history), 500.0);
    }

    #[test]
    fn test_zero_volume_resolved_everywhere() {
        let mut history = three_full_tanks();
        history[0].volume = 0.0;
        history[0].preco = 4.0;
        history[0].valor_total = 80.0;

        let stats = RefuellingStats::from_history(&history);

        assert_eq!(stats.refuelling_volume, Some(20.0));
        assert_eq!(stats.refuelling_volume_total, Some(45.0));
        assert_eq!(stats.refuelling_last_average, Some(500.0));
        assert_eq!(stats.refuelling_price_lowest, Some(4.0));
    }

    #[test]
    fn test_single_refuelling() {
        let history = vec![refuelling("2024-03-01 10:00:00", 30000, 20.0, true)];
        let stats = RefuellingStats::from_history(&history);

        assert_eq!(stats.refuelling_total, 1);
        assert_eq!(stats.refuelling_distance, Some(0));
        assert_eq!(stats.refuelling_general_average, None);
        assert_eq!(stats.refuelling_last_average, None);
        assert_eq!(stats.refuelling_odometer, Some(30000));
        assert_eq!(stats.refuelling_tank_full, Some(true));
    }

    #[test]
    fn test_general_average_with_no_volume() {
        let history = vec![
            refuelling("2024-03-01 10:00:00", 30000, 0.0, true),
            refuelling("2024-02-01 10:00:00", 20000, 0.0, true),
        ];
        let stats = RefuellingStats::from_history(&history);

        assert_eq!(stats.refuelling_general_average, Some(0.0));
        assert_eq!(stats.refuelling_last_average, Some(0.0));
    }

    #[test]
    fn test_history_new_sorts_newest_first() {
        let history = VehicleHistory::new(
            vec![
                refuelling("2024-01-01 10:00:00", 10000, 10.0, true),
                refuelling("2024-03-01 10:00:00", 30000, 20.0, true),
            ],
            vec![],
            vec![],
        );

        assert_eq!(history.refuellings[0].odometro, 30000);
    }

    #[test]
    fn test_latest_odometer_merges_all_sources() {
        let history = VehicleHistory::new(
            vec![refuelling("2024-03-01 10:00:00", 30000, 20.0, true)],
            vec![odometer("2024-03-15 09:00:00", 30500)],
            vec![odometer("2024-02-01 09:00:00", 29000)],
        );

        let latest = history.latest_odometer().unwrap();
        assert_eq!(latest.odometro, 30500);
        assert_eq!(latest.data, "2024-03-15 09:00:00");
    }

    #[test]
    fn test_latest_odometer_skips_entries_without_reading() {
        let history = VehicleHistory::new(
            vec![refuelling("2024-03-01 10:00:00", 30000, 20.0, true)],
            vec![HistoryEntry {
                data: "2024-03-20 09:00:00".to_string(),
                odometro: None,
            }],
            vec![
                odometer("2024-03-10 10:00:00", 30200),
                HistoryEntry {
                    data: "2024-01-10 10:00:00".to_string(),
                    odometro: None,
                },
            ],
        );

        let latest = history.latest_odometer().unwrap();
        assert_eq!(latest.odometro, 30200);
        assert_eq!(latest.data, "2024-03-10 10:00:00");
    }

    #[test]
    fn test_latest_odometer_empty() {
        assert!(VehicleHistory::default().latest_odometer().is_none());
    }

    #[test]
    fn test_build_summary() {
        let profile = VehicleProfile {
            nome: Some(String::new()),
            placa: Some("ABC123".to_string()),
            marca: "Fiat".to_string(),
            modelo: "Uno".to_string(),
            unidade_distancia: Some(2),
        };
        let history = VehicleHistory::new(three_full_tanks(), vec![], vec![]);

        let summary = VehicleSummary::build("42", &profile, &history, Some("BRL".to_string()));

        assert_eq!(summary.id, "42");
        assert_eq!(summary.name, None);
        assert_eq!(summary.identification, "ABC123");
        assert_eq!(summary.plate.as_deref(), Some("ABC123"));
        assert_eq!(summary.distance_unit, Some(DistanceUnit::Miles));
        assert_eq!(summary.odometer, Some(30000));
        assert_eq!(summary.odometer_date.as_deref(), Some("2024-03-01 10:00:00"));
        assert_eq!(summary.refuelling.refuelling_total, 3);
        assert_eq!(summary.currency.as_deref(), Some("BRL"));
    }

    #[test]
    fn test_summary_serializes_flat() {
        let profile = VehicleProfile {
            marca: "Fiat".to_string(),
            modelo: "Uno".to_string(),
            ..Default::default()
        };
        let summary = VehicleSummary::build("7", &profile, &VehicleHistory::default(), None);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["identification"], "Fiat/Uno");
        assert_eq!(json["refuelling_total"], 0);
        assert!(json["refuelling_last_average"].is_null());
        assert!(json["currency"].is_null());
    }
}
