//! HTTP client for the Ignite Gym backend

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{GymApi, ProfileUpdate};
use crate::avatar::AvatarUpload;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AuthSession, Exercise, HistoryByDay};

/// Default timeout when no config is at hand
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ignite Gym API client
#[derive(Debug, Clone)]
pub struct GymClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GymClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {e}");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Create a client from the user's configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_timeout(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is set
    pub const fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    /// Public URL of an uploaded avatar
    pub fn avatar_url(&self, file: &str) -> String {
        format!("{}/avatar/{}", self.base_url, file)
    }

    /// Public URL of an exercise thumbnail
    pub fn thumb_url(&self, file: &str) -> String {
        format!("{}/exercise/thumb/{}", self.base_url, file)
    }

    /// Public URL of an exercise demo animation
    pub fn demo_url(&self, file: &str) -> String {
        format!("{}/exercise/demo/{}", self.base_url, file)
    }

    /// Build API URL
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = expect_success(self.authorized(request).send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn execute(&self, request: RequestBuilder) -> AppResult<()> {
        expect_success(self.authorized(request).send().await?).await?;
        Ok(())
    }
}

/// Error body convention of the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into an [`AppError`].
///
/// A JSON body with a `message` field becomes an application error carrying
/// that message; anything else is unexpected.
async fn expect_success(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", body.message);
            Err(AppError::application(body.message, status.as_u16()))
        }
        Err(_) => {
            tracing::warn!(status = status.as_u16(), "request failed without message");
            Err(AppError::Unexpected(format!("HTTP {status}")))
        }
    }
}

// ==================== API Types ====================

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterHistoryRequest<'a> {
    exercise_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    avatar: String,
}

impl GymApi for GymClient {
    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        tracing::debug!("POST /sessions for {email}");
        let request = self
            .client
            .post(self.url("/sessions"))
            .json(&SignInRequest { email, password });
        self.fetch(request).await
    }

    async fn create_user(&self, name: &str, email: &str, password: &str) -> AppResult<()> {
        tracing::debug!("POST /users for {email}");
        let request = self.client.post(self.url("/users")).json(&CreateUserRequest {
            name,
            email,
            password,
        });
        self.execute(request).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<()> {
        tracing::debug!(
            changes_password = update.password.is_some(),
            "PUT /users"
        );
        let request = self.client.put(self.url("/users")).json(update);
        self.execute(request).await
    }

    async fn update_avatar(&self, upload: &AvatarUpload) -> AppResult<String> {
        tracing::debug!(size = upload.bytes.len(), "PATCH /users/avatar");
        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)?;
        let form = multipart::Form::new().part("avatar", part);

        let request = self.client.patch(self.url("/users/avatar")).multipart(form);
        let response: AvatarResponse = self.fetch(request).await?;
        Ok(response.avatar)
    }

    async fn groups(&self) -> AppResult<Vec<String>> {
        self.fetch(self.client.get(self.url("/groups"))).await
    }

    async fn exercises_by_group(&self, group: &str) -> AppResult<Vec<Exercise>> {
        let url = self.url(&format!(
            "/exercises/bygroup/{}",
            urlencoding::encode(group)
        ));
        self.fetch(self.client.get(url)).await
    }

    async fn exercise(&self, id: &str) -> AppResult<Exercise> {
        let url = self.url(&format!("/exercises/{}", urlencoding::encode(id)));
        self.fetch(self.client.get(url)).await
    }

    async fn history(&self) -> AppResult<Vec<HistoryByDay>> {
        self.fetch(self.client.get(self.url("/history"))).await
    }

    async fn register_history(&self, exercise_id: &str) -> AppResult<()> {
        let request = self
            .client
            .post(self.url("/history"))
            .json(&RegisterHistoryRequest { exercise_id });
        self.execute(request).await
    }
}
