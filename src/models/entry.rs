// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted integration entry and its schema migration.
//!
//! Version 1 stored a single vehicle id; version 2 stores a list.

use serde::{Deserialize, Serialize};

/// Current entry schema version.
pub const ENTRY_VERSION: u32 = 2;

/// Integration entry (schema version 2).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub email: String,
    pub password: String,
    pub vehicles: Vec<String>,
}

impl std::fmt::Debug for EntryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("vehicles", &self.vehicles)
            .finish()
    }
}

/// Integration entry (schema version 1).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyEntryData {
    pub email: String,
    pub password: String,
    pub id_vehicle: String,
}

/// An entry as read from storage, in whichever schema it was written.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Current(EntryData),
    Legacy(LegacyEntryData),
}

impl StoredEntry {
    pub fn version(&self) -> u32 {
        match self {
            StoredEntry::Current(_) => ENTRY_VERSION,
            StoredEntry::Legacy(_) => 1,
        }
    }

    /// Bring the entry up to the current schema.
    pub fn migrate(self) -> EntryData {
        let from = self.version();
        let entry = match self {
            StoredEntry::Current(entry) => return entry,
            StoredEntry::Legacy(legacy) => EntryData {
                email: legacy.email,
                password: legacy.password,
                vehicles: vec![legacy.id_vehicle],
            },
        };

        tracing::debug!(from, "Migrating entry");
        tracing::info!(version = ENTRY_VERSION, "Migration successful");
        entry
    }
}
