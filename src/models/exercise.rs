//! Exercise catalog model

use serde::{Deserialize, Serialize};

use super::{deserialize_count, deserialize_id};

/// An exercise from the catalog (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Server identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Exercise name
    pub name: String,
    /// Number of series
    #[serde(deserialize_with = "deserialize_count")]
    pub series: u32,
    /// Repetitions per series
    #[serde(deserialize_with = "deserialize_count")]
    pub repetitions: u32,
    /// Muscle group this exercise belongs to
    pub group: String,
    /// Demo animation file name
    #[serde(default)]
    pub demo: String,
    /// Thumbnail file name
    #[serde(default)]
    pub thumb: String,
}

impl Exercise {
    /// Short "3 series x 12 repetitions" summary
    pub fn summary(&self) -> String {
        format!("{} series x {} repetitions", self.series, self.repetitions)
    }
}
