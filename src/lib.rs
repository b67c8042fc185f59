//! # Ignite Gym 🏋️
//!
//! A terminal client for the Ignite Gym workout tracker.
//!
//! ## Overview
//!
//! Sign in or create an account, browse exercises by muscle group, mark them
//! as done, review your history day by day, and keep your profile and avatar
//! up to date. Everything talks to the Ignite Gym HTTP backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │   Screens, key handling, async worker, result application   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │      Form       │ │     Session     │ │     Router      │
//! │                 │ │                 │ │                 │
//! │ • Submit cycle  │ │ • Current user  │ │ • Auth flow     │
//! │ • Field errors  │ │ • Sign in/up    │ │ • App flow      │
//! │ • Stale guard   │ │ • Apply on ok   │ │ • Back stacks   │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │
//!          ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   Validation    │ │       API       │ │      Auth       │
//! │                 │ │                 │ │                 │
//! │ • Rule set      │ │ • GymApi trait  │ │ • Encrypted     │
//! │ • Schemas       │ │ • HTTP client   │ │   session file  │
//! │ • Cross-field   │ │ • AppError      │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — Backend API trait and HTTP client
//! - [`app`] — TUI application state and event loop
//! - [`auth`] — Encrypted storage of the signed-in session
//! - [`avatar`] — Local checks before an avatar upload
//! - [`config`] — Configuration management
//! - [`error`] — Error taxonomy shown to users
//! - [`form`] — Form controller and submission state machine
//! - [`models`] — Data models (User, Exercise, History)
//! - [`notification`] — Transient banners
//! - [`router`] — Navigation stacks
//! - [`session`] — Session context
//! - [`theme`] — Theme support via ratatui-themes
//! - [`validation`] — Declarative field rules and form schemas
//!
//! ## Example
//!
//! ```no_run
//! use ignite_gym::validation::{FormValues, schemas};
//!
//! let mut values = FormValues::new();
//! values.insert("email".into(), "a@b.com".into());
//! values.insert("password".into(), "123".into());
//!
//! let errors = schemas::sign_in().validate(&values).unwrap_err();
//! assert_eq!(
//!     errors.get("password"),
//!     Some("Password must be at least 6 characters.")
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod avatar;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod notification;
pub mod paths;
pub mod router;
pub mod session;
pub mod theme;
pub mod validation;

// Re-export main types for convenience
pub use api::{GymApi, GymClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use form::{Form, Phase};
pub use models::{AuthSession, Exercise, HistoryByDay, HistoryEntry, User};
pub use router::{Route, Router};
pub use session::Session;
pub use theme::{Theme, ThemeColors};

/// ASCII logo for the application
pub const LOGO: &str = r"
  ___ ___ _  _ ___ _____ ___    ___ _____ __  __
 |_ _/ __| \| |_ _|_   _| __|  / __\ \ / /  \/  |
  | | (_ | .` || |  | | | _|  | (_ |\ V /| |\/| |
 |___\___|_|\_|___| |_| |___|  \___| |_| |_|  |_|
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
