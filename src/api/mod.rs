//! Ignite Gym backend API
//!
//! [`GymApi`] is the seam between the app and the network: the session
//! context and the background worker only talk to this trait, and tests plug
//! in an in-memory implementation.

mod client;

pub use client::GymClient;

use serde::Serialize;

use crate::avatar::AvatarUpload;
use crate::error::AppResult;
use crate::models::{AuthSession, Exercise, HistoryByDay};

/// Body of `PUT /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// New display name
    pub name: String,
    /// New password, when changing it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Current password, required by the backend to change it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
}

impl ProfileUpdate {
    /// Build the request body; the current password is only sent alongside a new one
    pub fn new(name: impl Into<String>, password: Option<String>, old_password: Option<String>) -> Self {
        let old_password = password.as_ref().and(old_password);
        Self {
            name: name.into(),
            password,
            old_password,
        }
    }
}

/// Operations offered by the gym backend
#[allow(async_fn_in_trait)]
pub trait GymApi {
    /// Set (or clear) the bearer token sent with every request
    fn set_token(&mut self, token: Option<String>);

    /// `POST /sessions`
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// `POST /users`
    async fn create_user(&self, name: &str, email: &str, password: &str) -> AppResult<()>;

    /// `PUT /users`
    async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<()>;

    /// `PATCH /users/avatar`, returns the stored avatar file name
    async fn update_avatar(&self, upload: &AvatarUpload) -> AppResult<String>;

    /// `GET /groups`
    async fn groups(&self) -> AppResult<Vec<String>>;

    /// `GET /exercises/bygroup/{group}`
    async fn exercises_by_group(&self, group: &str) -> AppResult<Vec<Exercise>>;

    /// `GET /exercises/{id}`
    async fn exercise(&self, id: &str) -> AppResult<Exercise>;

    /// `GET /history`
    async fn history(&self) -> AppResult<Vec<HistoryByDay>>;

    /// `POST /history`
    async fn register_history(&self, exercise_id: &str) -> AppResult<()>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory backend used by unit tests

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{GymApi, ProfileUpdate};
    use crate::avatar::AvatarUpload;
    use crate::error::{AppError, AppResult};
    use crate::models::{AuthSession, Exercise, HistoryByDay, User};

    /// Scripted backend that records every call
    #[derive(Default)]
    pub struct FakeApi {
        pub token: Option<String>,
        pub calls: RefCell<Vec<String>>,
        pub failures: RefCell<VecDeque<(String, AppError)>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next call to `op` fail with `error`
        pub fn fail(self, op: &str, error: AppError) -> Self {
            self.failures.borrow_mut().push_back((op.to_string(), error));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: String) -> AppResult<()> {
            let op = call.split(' ').next().unwrap_or_default().to_string();
            self.calls.borrow_mut().push(call);
            let mut failures = self.failures.borrow_mut();
            if let Some(pos) = failures.iter().position(|(name, _)| *name == op) {
                let (_, error) = failures.remove(pos).unwrap();
                return Err(error);
            }
            Ok(())
        }
    }

    pub fn user() -> User {
        User {
            id: "1".into(),
            name: "Ana Souza".into(),
            email: "ana@gym.com".into(),
            avatar: None,
        }
    }

    impl GymApi for FakeApi {
        fn set_token(&mut self, token: Option<String>) {
            self.token = token;
        }

        async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
            self.record(format!("sign_in {email} {password}"))?;
            Ok(AuthSession {
                user: User {
                    email: email.to_string(),
                    ..user()
                },
                token: "token-1".into(),
                signed_in_at: chrono::Utc::now(),
            })
        }

        async fn create_user(&self, name: &str, email: &str, password: &str) -> AppResult<()> {
            self.record(format!("create_user {name} {email} {password}"))
        }

        async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<()> {
            self.record(format!(
                "update_profile {} {}",
                update.name,
                update.password.as_deref().unwrap_or("-")
            ))
        }

        async fn update_avatar(&self, upload: &AvatarUpload) -> AppResult<String> {
            self.record(format!("update_avatar {}", upload.file_name))?;
            Ok(format!("stored-{}", upload.file_name))
        }

        async fn groups(&self) -> AppResult<Vec<String>> {
            self.record("groups".into())?;
            Ok(vec!["costas".into(), "ombro".into()])
        }

        async fn exercises_by_group(&self, group: &str) -> AppResult<Vec<Exercise>> {
            self.record(format!("exercises_by_group {group}"))?;
            Ok(Vec::new())
        }

        async fn exercise(&self, id: &str) -> AppResult<Exercise> {
            self.record(format!("exercise {id}"))?;
            Ok(Exercise {
                id: id.to_string(),
                name: "Remada curvada".into(),
                series: 3,
                repetitions: 12,
                group: "costas".into(),
                demo: String::new(),
                thumb: String::new(),
            })
        }

        async fn history(&self) -> AppResult<Vec<HistoryByDay>> {
            self.record("history".into())?;
            Ok(Vec::new())
        }

        async fn register_history(&self, exercise_id: &str) -> AppResult<()> {
            self.record(format!("register_history {exercise_id}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_password_dropped_without_new_password() {
        let update = ProfileUpdate::new("Ana", None, Some("123456".into()));
        assert_eq!(update.old_password, None);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "Ana"})
        );
    }

    #[test]
    fn test_old_password_sent_with_new_password() {
        let update = ProfileUpdate::new("Ana", Some("abcdef".into()), Some("123456".into()));
        assert_eq!(update.old_password.as_deref(), Some("123456"));
        assert_eq!(update.password.as_deref(), Some("abcdef"));
    }
}
