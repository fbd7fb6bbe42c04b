//! User-facing notices raised while setting up an integration entry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// A notice about a configuration problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Stable id; raising the same id twice replaces the first notice
    pub issue_id: String,
    pub severity: IssueSeverity,
    pub is_fixable: bool,
    pub translation_key: &'static str,
    /// Values substituted into the translated message
    pub placeholders: Vec<(&'static str, String)>,
}

impl Issue {
    /// A configured vehicle id did not resolve to a profile.
    pub fn vehicle_non_existent(vehicle_id: &str) -> Self {
        Self {
            issue_id: format!("{}_vehicle_non_existent", vehicle_id),
            severity: IssueSeverity::Warning,
            is_fixable: false,
            translation_key: "vehicle_non_existent",
            placeholders: vec![("vehicle", vehicle_id.to_string())],
        }
    }
}
