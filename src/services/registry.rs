// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration registry.
//!
//! Owns every set-up integration entry, keyed by entry id. Setting up an
//! entry authenticates once, does a first refresh per vehicle and starts the
//! pollers; unloading stops them and withdraws their published summaries.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::error::Result;
use crate::models::{EntryData, Issue, VehicleSummary};
use crate::services::aggregator::VehicleAggregator;
use crate::services::drivvo::{Credentials, DrivvoClient};
use crate::services::poller::{PollerHandle, SummaryStore, VehiclePoller};

/// Outcome of setting up an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    /// Vehicles now being polled
    pub active: Vec<String>,
    /// Configured vehicles that did not resolve to a profile
    pub missing: Vec<String>,
}

/// A set-up entry and its running pollers.
struct RegisteredEntry {
    pollers: Vec<PollerHandle>,
}

impl RegisteredEntry {
    /// Stop every poller and wait for their tasks to end.
    async fn shutdown(&mut self) {
        for poller in &mut self.pollers {
            poller.shutdown().await;
        }
    }

    fn vehicle_ids(&self) -> impl Iterator<Item = &str> {
        self.pollers.iter().map(PollerHandle::vehicle_id)
    }
}

/// Registry of integration entries.
pub struct IntegrationRegistry {
    client: DrivvoClient,
    interval: Duration,
    store: SummaryStore,
    entries: DashMap<String, RegisteredEntry>,
    issues: DashMap<String, Issue>,
}

impl IntegrationRegistry {
    pub fn new(client: DrivvoClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            store: Arc::new(DashMap::new()),
            entries: DashMap::new(),
            issues: DashMap::new(),
        }
    }

    /// Set up an entry.
    ///
    /// Fails with [`crate::error::AppError::AuthenticationFailed`] when the credentials are
    /// rejected; nothing is registered in that case. Vehicles whose first
    /// refresh returns nothing raise a "vehicle non-existent" issue and are
    /// not polled. An existing entry with the same id is replaced.
    pub async fn setup(&self, entry_id: &str, entry: EntryData) -> Result<SetupReport> {
        let credentials = Credentials::new(entry.email, entry.password);

        self.client.authenticate(&credentials).await?;

        let aggregator = VehicleAggregator::new(self.client.clone(), credentials);
        let mut report = SetupReport::default();
        let mut pollers = Vec::with_capacity(entry.vehicles.len());

        for vehicle_id in entry.vehicles {
            let poller = VehiclePoller::new(
                vehicle_id.clone(),
                aggregator.clone(),
                self.store.clone(),
                self.interval,
            );

            match poller.refresh().await {
                Some(summary) => {
                    tracing::info!(
                        entry_id,
                        vehicle_id = %vehicle_id,
                        identification = %summary.identification,
                        "Vehicle set up"
                    );
                    self.issues
                        .remove(&Issue::vehicle_non_existent(&vehicle_id).issue_id);
                    pollers.push(poller.spawn());
                    report.active.push(vehicle_id);
                }
                None => {
                    tracing::warn!(
                        entry_id,
                        vehicle_id = %vehicle_id,
                        "Configured vehicle does not exist"
                    );
                    let issue = Issue::vehicle_non_existent(&vehicle_id);
                    self.issues.insert(issue.issue_id.clone(), issue);
                    report.missing.push(vehicle_id);
                }
            }
        }

        if let Some(mut previous) = self
            .entries
            .insert(entry_id.to_string(), RegisteredEntry { pollers })
        {
            tracing::info!(entry_id, "Replacing existing entry");
            previous.shutdown().await;
            self.withdraw_unpolled(previous.vehicle_ids());
        }

        Ok(report)
    }

    /// Unload an entry. Returns `false` if it was not set up.
    ///
    /// Summaries are withdrawn only after the entry's poller tasks have
    /// ended, so an in-flight poll cannot republish them.
    pub async fn unload(&self, entry_id: &str) -> bool {
        let Some((_, mut entry)) = self.entries.remove(entry_id) else {
            return false;
        };

        entry.shutdown().await;
        self.withdraw_unpolled(entry.vehicle_ids());

        tracing::info!(entry_id, "Entry unloaded");
        true
    }

    /// Unload every entry.
    pub async fn unload_all(&self) {
        let ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        for entry_id in ids {
            self.unload(&entry_id).await;
        }
    }

    pub fn is_loaded(&self, entry_id: &str) -> bool {
        self.entries.contains_key(entry_id)
    }

    /// Remove published summaries no loaded entry polls any more.
    fn withdraw_unpolled<'a>(&self, vehicle_ids: impl Iterator<Item = &'a str>) {
        for vehicle_id in vehicle_ids {
            if !self.is_polled(vehicle_id) {
                self.store.remove(vehicle_id);
            }
        }
    }

    /// Whether any loaded entry still polls this vehicle.
    fn is_polled(&self, vehicle_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.vehicle_ids().any(|id| id == vehicle_id))
    }

    /// Number of running pollers across all entries.
    pub fn active_pollers(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.pollers.iter().filter(|p| p.is_running()).count())
            .sum()
    }

    /// All published summaries, ordered by vehicle id.
    pub fn summaries(&self) -> Vec<VehicleSummary> {
        let mut summaries: Vec<VehicleSummary> =
            self.store.iter().map(|entry| entry.value().clone()).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub fn summary(&self, vehicle_id: &str) -> Option<VehicleSummary> {
        self.store.get(vehicle_id).map(|entry| entry.value().clone())
    }

    /// Raised issues, ordered by id.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self.issues.iter().map(|e| e.value().clone()).collect();
        issues.sort_by(|a, b| a.issue_id.cmp(&b.issue_id));
        issues
    }

    pub fn client(&self) -> &DrivvoClient {
        &self.client
    }
}

