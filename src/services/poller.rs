// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-vehicle polling.
//!
//! Each configured vehicle gets its own [`VehiclePoller`] with the vehicle id
//! bound at construction. A poller runs the aggregator on a fixed interval
//! and publishes the result into the shared [`SummaryStore`].

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::models::VehicleSummary;
use crate::services::aggregator::VehicleAggregator;

/// Latest published summary per vehicle id.
pub type SummaryStore = Arc<DashMap<String, VehicleSummary>>;

/// Polls one vehicle.
#[derive(Clone)]
pub struct VehiclePoller {
    vehicle_id: String,
    aggregator: VehicleAggregator,
    store: SummaryStore,
    interval: Duration,
}

impl VehiclePoller {
    pub fn new(
        vehicle_id: impl Into<String>,
        aggregator: VehicleAggregator,
        store: SummaryStore,
        interval: Duration,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            aggregator,
            store,
            interval,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Run one poll cycle and publish the outcome.
    ///
    /// Returns the fresh summary, or `None` when the vehicle is unavailable
    /// this cycle (its stored summary is then removed).
    pub async fn refresh(&self) -> Option<VehicleSummary> {
        match self
            .aggregator
            .fetch_vehicle_summary(&self.vehicle_id)
            .await
        {
            Some(summary) => {
                self.store.insert(self.vehicle_id.clone(), summary.clone());
                Some(summary)
            }
            None => {
                if self.store.remove(&self.vehicle_id).is_some() {
                    tracing::info!(vehicle_id = %self.vehicle_id, "Vehicle data now unavailable");
                }
                None
            }
        }
    }

    /// Start polling in the background.
    ///
    /// The first cycle runs one interval from now; callers do the initial
    /// refresh themselves. Dropping the handle stops the task.
    pub fn spawn(self) -> PollerHandle {
        let vehicle_id = self.vehicle_id.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tracing::debug!(vehicle_id = %self.vehicle_id, "Polling vehicle");
                self.refresh().await;
            }
        });

        tracing::info!(vehicle_id = %vehicle_id, interval_secs = period.as_secs(), "Poller started");
        PollerHandle { vehicle_id, task }
    }
}

/// Running poller; aborts its task when stopped or dropped.
pub struct PollerHandle {
    vehicle_id: String,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop polling without waiting for the task to wind down.
    pub fn stop(&self) {
        if !self.task.is_finished() {
            self.task.abort();
            tracing::info!(vehicle_id = %self.vehicle_id, "Poller stopped");
        }
    }

    /// Stop polling and wait until the task has ended.
    ///
    /// Once this returns the poller can no longer touch the store.
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                tracing::error!(vehicle_id = %self.vehicle_id, error = %e, "Poller task failed");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
