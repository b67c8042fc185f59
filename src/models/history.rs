//! Workout history models

use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// One completed exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Server identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Exercise name
    pub name: String,
    /// Muscle group
    pub group: String,
    /// Time of day the exercise was registered (e.g. "08:42")
    pub hour: String,
    /// Raw creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

/// History entries grouped under a day heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryByDay {
    /// Day heading (e.g. "26.08.23")
    pub title: String,
    /// Entries registered that day
    pub data: Vec<HistoryEntry>,
}
