//! Authenticated user model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// The signed-in user as returned by `POST /sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email (read-only after sign-up)
    pub email: String,
    /// Avatar file name on the server, if one was uploaded
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// First name for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// User plus the credential that authenticates them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Authenticated user
    pub user: User,
    /// Bearer token for subsequent requests
    pub token: String,
    /// When this session was established locally
    #[serde(default = "Utc::now")]
    pub signed_in_at: DateTime<Utc>,
}
