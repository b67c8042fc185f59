//! Data models for Ignite Gym

mod exercise;
mod history;
mod user;

pub use exercise::Exercise;
pub use history::{HistoryByDay, HistoryEntry};
pub use user::{AuthSession, User};

use serde::{Deserialize, Deserializer};

/// Identifier as sent by the API.
///
/// The backend emits numeric ids, older deployments emit strings; both end up
/// as a string on our side.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Counter such as series or repetitions, numeric or textual on the wire
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Number(u32),
        Text(String),
    }

    match RawCount::deserialize(deserializer)? {
        RawCount::Number(n) => Ok(n),
        RawCount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
