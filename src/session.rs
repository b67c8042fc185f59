//! Session context: the single owner of the signed-in user
//!
//! Screens read the current user through [`Session`] and change it only
//! through its operations. An update touches the user only once the backend
//! has accepted it, so a failed request never leaves a half-applied user
//! behind.
//!
//! The free functions ([`authenticate`], [`register`], [`save_profile`],
//! [`save_avatar`]) hold the request sequencing. The background worker runs
//! them and hands the accepted change back to the UI thread, which applies it
//! to whichever user is current at that moment with [`Session::establish`],
//! [`Session::rename`] or [`Session::set_avatar`]. Two saves in flight at once
//! therefore each change only their own field.

use crate::api::{GymApi, ProfileUpdate};
use crate::auth::SessionStore;
use crate::avatar::AvatarUpload;
use crate::error::{AppError, AppResult};
use crate::models::{AuthSession, User};

/// Sign in against the backend
pub async fn authenticate<A: GymApi>(api: &A, email: &str, password: &str) -> AppResult<AuthSession> {
    let auth = api.sign_in(email, password).await?;
    tracing::info!(user_id = %auth.user.id, "signed in");
    Ok(auth)
}

/// Create the account, then sign in with the same credentials.
///
/// When account creation fails the sign-in is not attempted.
pub async fn register<A: GymApi>(
    api: &A,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<AuthSession> {
    api.create_user(name, email, password).await?;
    tracing::info!("account created");
    authenticate(api, email, password).await
}

/// Persist a profile change and return the accepted display name
pub async fn save_profile<A: GymApi>(api: &A, update: &ProfileUpdate) -> AppResult<String> {
    api.update_profile(update).await?;
    tracing::info!(password_changed = update.password.is_some(), "profile updated");
    Ok(update.name.clone())
}

/// Upload a new avatar and return the stored avatar reference
pub async fn save_avatar<A: GymApi>(api: &A, upload: &AvatarUpload) -> AppResult<String> {
    let avatar = api.update_avatar(upload).await?;
    tracing::info!(avatar = %avatar, "avatar updated");
    Ok(avatar)
}

/// Process-wide authentication state
#[derive(Debug, Default)]
pub struct Session {
    current: Option<AuthSession>,
    store: Option<SessionStore>,
}

impl Session {
    /// Unauthenticated session with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Session backed by `store`, restored from it when it holds a session
    pub fn restore(store: SessionStore) -> Self {
        let current = store.load();
        if let Some(auth) = &current {
            tracing::debug!(user_id = %auth.user.id, "session restored");
        }
        Self {
            current,
            store: Some(store),
        }
    }

    /// The signed-in user
    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|auth| &auth.user)
    }

    /// Bearer token of the signed-in user
    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|auth| auth.token.as_str())
    }

    /// Whether someone is signed in
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Make `auth` the current session and persist it
    pub fn establish(&mut self, auth: AuthSession) {
        self.current = Some(auth);
        self.persist();
    }

    /// Set the display name of the current user
    pub fn rename(&mut self, name: &str) {
        self.edit_user(|user| user.name = name.to_string());
    }

    /// Point the current user at a new avatar
    pub fn set_avatar(&mut self, avatar: &str) {
        self.edit_user(|user| user.avatar = Some(avatar.to_string()));
    }

    /// Ignored when nobody is signed in (e.g. a late update after sign-out)
    fn edit_user(&mut self, edit: impl FnOnce(&mut User)) {
        let Some(auth) = self.current.as_mut() else {
            tracing::debug!("dropping user update: signed out");
            return;
        };
        edit(&mut auth.user);
        self.persist();
    }

    /// Forget the user and the stored credential
    pub fn sign_out(&mut self) {
        self.current = None;
        if let Some(store) = &self.store
            && let Err(e) = store.clear()
        {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
        tracing::info!("signed out");
    }

    /// Sign in and start sending the new token
    pub async fn sign_in<A: GymApi>(&mut self, api: &mut A, email: &str, password: &str) -> AppResult<()> {
        let auth = authenticate(&*api, email, password).await?;
        api.set_token(Some(auth.token.clone()));
        self.establish(auth);
        Ok(())
    }

    /// Create the account and sign straight in
    pub async fn sign_up<A: GymApi>(
        &mut self,
        api: &mut A,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<()> {
        let auth = register(&*api, name, email, password).await?;
        api.set_token(Some(auth.token.clone()));
        self.establish(auth);
        Ok(())
    }

    /// Apply a profile change; the stored user changes only on success
    pub async fn update_profile<A: GymApi>(&mut self, api: &A, update: &ProfileUpdate) -> AppResult<()> {
        self.require_user()?;
        let name = save_profile(api, update).await?;
        self.rename(&name);
        Ok(())
    }

    /// Replace the avatar; the stored user changes only on success
    pub async fn update_avatar<A: GymApi>(&mut self, api: &A, upload: &AvatarUpload) -> AppResult<()> {
        self.require_user()?;
        let avatar = save_avatar(api, upload).await?;
        self.set_avatar(&avatar);
        Ok(())
    }

    /// Sign out and stop sending the token
    pub fn sign_out_from<A: GymApi>(&mut self, api: &mut A) {
        api.set_token(None);
        self.sign_out();
    }

    fn require_user(&self) -> AppResult<&User> {
        self.user()
            .ok_or_else(|| AppError::Unexpected("not signed in".to_string()))
    }

    fn persist(&self) {
        if let (Some(store), Some(auth)) = (&self.store, &self.current)
            && let Err(e) = store.save(auth)
        {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }
}
