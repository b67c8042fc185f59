//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use async_ops::{AsyncCommand, AsyncResult, execute};
pub use state::{AppState, Mode};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::api::{GymApi, GymClient};
use crate::auth::SessionStore;
use crate::config::Config;
use crate::form::Resolution;
use crate::notification::Notification;
use crate::router::Route;
use crate::session::Session;
use crate::validation::schemas::fields;

use async_ops::{AsyncHandle, spawn_worker};

const SIGN_IN_FAILED: &str = "Could not sign in, try again later.";
const SIGN_UP_FAILED: &str = "Could not create the account, try again later.";
const PROFILE_FAILED: &str = "Could not update the profile, try again later.";
const AVATAR_FAILED: &str = "Could not update the avatar, try again later.";
const LOAD_FAILED: &str = "Could not load the data, try again later.";
const REGISTER_FAILED: &str = "Could not register the exercise, try again later.";

/// Run the TUI application
pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let session = Session::restore(SessionStore::open()?);

    // Worker owns the client; a restored session already has a token
    let mut client = GymClient::from_config(&config);
    client.set_token(session.token().map(String::from));
    let async_handle = spawn_worker(client);

    // SIGTERM/SIGHUP: leave the loop so the terminal is restored
    let terminated = Arc::new(AtomicBool::new(false));
    {
        let terminated = Arc::clone(&terminated);
        if let Err(e) = ctrlc::set_handler(move || terminated.store(true, Ordering::SeqCst)) {
            tracing::warn!(error = %e, "could not install signal handler");
        }
    }

    // The draw loop blocks; keep it off the runtime's worker threads
    tokio::task::spawn_blocking(move || {
        let mut state = AppState::new(config, session);
        run_terminal(&mut state, async_handle, &terminated)
    })
    .await?
}

fn run_terminal(state: &mut AppState, async_handle: AsyncHandle, terminated: &AtomicBool) -> Result<()> {
    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, state, async_handle, terminated);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Save config on exit (theme changes)
    state.config.save()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
    terminated: &AtomicBool,
) -> Result<()> {
    if let Some(cmd) = state.enter_screen() {
        let _ = async_handle.cmd_tx.blocking_send(cmd);
    }

    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            if let Some(cmd) = handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Tick for animations
        state.tick();

        if state.should_quit || terminated.load(Ordering::SeqCst) {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    Ok(())
}

/// Apply a worker result to the state, returning a follow-up command
pub fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Option<AsyncCommand> {
    match result {
        AsyncResult::SignedIn { ticket, result } => {
            let resolution = state.sign_in.resolve(ticket, result, SIGN_IN_FAILED);
            finish_authentication(state, resolution)
        }
        AsyncResult::SignedUp { ticket, result } => {
            let resolution = state.sign_up.resolve(ticket, result, SIGN_UP_FAILED);
            finish_authentication(state, resolution)
        }
        AsyncResult::ProfileSaved { ticket, result } => {
            match state.profile.resolve(ticket, result, PROFILE_FAILED) {
                Resolution::Succeeded(name) => {
                    state.session.rename(&name);
                    state.profile.clear(&[
                        fields::OLD_PASSWORD,
                        fields::PASSWORD,
                        fields::PASSWORD_CONFIRM,
                    ]);
                    state.notify(Notification::success("Profile updated!"));
                }
                Resolution::Failed(notification) => state.notify(notification),
                Resolution::Stale => {}
            }
            None
        }
        AsyncResult::AvatarSaved { ticket, result } => {
            match state.avatar.resolve(ticket, result, AVATAR_FAILED) {
                Resolution::Succeeded(avatar) => {
                    state.session.set_avatar(&avatar);
                    state.mode = Mode::Normal;
                    state.notify(Notification::success("Avatar updated!"));
                }
                Resolution::Failed(notification) => state.notify(notification),
                Resolution::Stale => {}
            }
            None
        }
        AsyncResult::Groups { epoch, result } => {
            if epoch != state.epoch {
                return None;
            }
            match result {
                Ok(groups) => {
                    // Keep the selected group across refreshes when it still exists
                    let keep = state
                        .home
                        .group()
                        .and_then(|current| groups.iter().position(|g| g == current))
                        .unwrap_or(0);
                    state.home.groups = groups;
                    if state.home.groups.is_empty() {
                        state.loading = false;
                        None
                    } else {
                        state.select_group(keep)
                    }
                }
                Err(e) => fetch_failed(state, &e),
            }
        }
        AsyncResult::Exercises {
            epoch,
            group,
            result,
        } => {
            if epoch != state.epoch || state.home.group() != Some(group.as_str()) {
                return None;
            }
            match result {
                Ok(exercises) => {
                    state.loading = false;
                    state.home.exercises = exercises;
                    state.home.selected_exercise = 0;
                    None
                }
                Err(e) => fetch_failed(state, &e),
            }
        }
        AsyncResult::Exercise { epoch, result } => {
            if epoch != state.epoch {
                return None;
            }
            match result {
                Ok(exercise) => {
                    state.loading = false;
                    state.exercise = Some(exercise);
                    None
                }
                Err(e) => fetch_failed(state, &e),
            }
        }
        AsyncResult::History { epoch, result } => {
            if epoch != state.epoch {
                return None;
            }
            match result {
                Ok(history) => {
                    state.loading = false;
                    state.history = history;
                    None
                }
                Err(e) => fetch_failed(state, &e),
            }
        }
        AsyncResult::HistoryRegistered { epoch, result } => {
            if epoch != state.epoch {
                return None;
            }
            state.registering = false;
            match result {
                Ok(()) => {
                    state.notify(Notification::success(
                        "Congratulations! Exercise registered in your history.",
                    ));
                    state.switch_tab(Route::History)
                }
                Err(e) => {
                    log_failure(&e);
                    state.notify(Notification::error(e.user_message(REGISTER_FAILED)));
                    None
                }
            }
        }
    }
}

fn finish_authentication(
    state: &mut AppState,
    resolution: Resolution<crate::models::AuthSession>,
) -> Option<AsyncCommand> {
    match resolution {
        Resolution::Succeeded(auth) => {
            state.session.establish(auth);
            state.sync_session()
        }
        Resolution::Failed(notification) => {
            state.notify(notification);
            None
        }
        // Nobody is waiting for this sign-in anymore; drop the token it set
        Resolution::Stale if !state.session.is_authenticated() => Some(AsyncCommand::SignOut),
        Resolution::Stale => None,
    }
}

fn fetch_failed(state: &mut AppState, error: &crate::error::AppError) -> Option<AsyncCommand> {
    state.loading = false;
    log_failure(error);
    state.notify(Notification::error(error.user_message(LOAD_FAILED)));
    None
}

fn log_failure(error: &crate::error::AppError) {
    if error.is_application() {
        tracing::info!("request rejected: {error}");
    } else {
        tracing::error!("request failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::user;
    use crate::error::AppError;
    use crate::form::SubmitOutcome;
    use crate::models::AuthSession;
    use crate::notification::Level;

    fn auth() -> AuthSession {
        AuthSession {
            user: user(),
            token: "t".into(),
            signed_in_at: chrono::Utc::now(),
        }
    }

    fn signed_out() -> AppState {
        let mut state = AppState::new(Config::default(), Session::new());
        state.enter_screen();
        state
    }

    fn signed_in() -> AppState {
        let mut session = Session::new();
        session.establish(auth());
        let mut state = AppState::new(Config::default(), session);
        state.enter_screen();
        state
    }

    fn submit_sign_in(state: &mut AppState) -> crate::form::SubmitTicket {
        state.sign_in.set_value(fields::EMAIL, "a@b.com");
        state.sign_in.set_value(fields::PASSWORD, "123456");
        match state.sign_in.submit() {
            SubmitOutcome::Accepted(submission) => submission.ticket,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_shown_verbatim() {
        let mut state = signed_out();
        let ticket = submit_sign_in(&mut state);

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::SignedIn {
                ticket,
                result: Err(AppError::application("Invalid credentials.", 400)),
            },
        );

        assert!(cmd.is_none());
        let banner = state.notification.as_ref().unwrap();
        assert_eq!(banner.title, "Invalid credentials.");
        assert_eq!(banner.level, Level::Error);
        assert!(!state.sign_in.is_loading());
        // Values survive for a retry
        assert_eq!(state.sign_in.value(fields::EMAIL), "a@b.com");
    }

    #[test]
    fn test_network_failure_uses_fallback() {
        let mut state = signed_out();
        let ticket = submit_sign_in(&mut state);

        handle_async_result(
            &mut state,
            AsyncResult::SignedIn {
                ticket,
                result: Err(AppError::Network("connection refused".into())),
            },
        );

        assert_eq!(state.notification.as_ref().unwrap().title, SIGN_IN_FAILED);
    }

    #[test]
    fn test_sign_in_lands_on_home_and_loads_groups() {
        let mut state = signed_out();
        let ticket = submit_sign_in(&mut state);

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::SignedIn {
                ticket,
                result: Ok(auth()),
            },
        );

        assert!(state.session.is_authenticated());
        assert_eq!(state.route(), &Route::Home);
        assert!(matches!(cmd, Some(AsyncCommand::FetchGroups { .. })));
    }

    #[test]
    fn test_sign_in_after_leaving_screen_is_dropped() {
        let mut state = signed_out();
        let ticket = submit_sign_in(&mut state);
        state.navigate(Route::SignUp);
        state.back();

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::SignedIn {
                ticket,
                result: Ok(auth()),
            },
        );

        assert!(!state.session.is_authenticated());
        assert!(matches!(cmd, Some(AsyncCommand::SignOut)));
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut state = signed_in();
        let old_epoch = state.epoch;
        state.navigate(Route::History);

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::Groups {
                epoch: old_epoch,
                result: Ok(vec!["costas".into()]),
            },
        );

        assert!(cmd.is_none());
        assert!(state.home.groups.is_empty());
    }

    #[test]
    fn test_groups_select_first_and_fetch_exercises() {
        let mut state = signed_in();
        let epoch = state.epoch;
        let cmd = handle_async_result(
            &mut state,
            AsyncResult::Groups {
                epoch,
                result: Ok(vec!["costas".into(), "ombro".into()]),
            },
        );

        assert_eq!(state.home.group(), Some("costas"));
        assert!(matches!(
            cmd,
            Some(AsyncCommand::FetchExercises { ref group, .. }) if group == "costas"
        ));
    }

    #[test]
    fn test_profile_failure_keeps_user() {
        let mut state = signed_in();
        state.navigate(Route::Profile);
        state.profile.set_value(fields::NAME, "Other");
        let SubmitOutcome::Accepted(submission) = state.profile.submit() else {
            panic!("profile should validate");
        };

        handle_async_result(
            &mut state,
            AsyncResult::ProfileSaved {
                ticket: submission.ticket,
                result: Err(AppError::Unexpected("HTTP 500".into())),
            },
        );

        assert_eq!(state.user().unwrap().name, "Ana Souza");
        assert_eq!(state.notification.as_ref().unwrap().title, PROFILE_FAILED);
    }

    #[test]
    fn test_profile_success_renames_user_and_clears_passwords() {
        let mut state = signed_in();
        state.navigate(Route::Profile);
        state.profile.set_value(fields::NAME, "Ana Lima");
        state.profile.set_value(fields::OLD_PASSWORD, "123456");
        state.profile.set_value(fields::PASSWORD, "abcdef");
        state.profile.set_value(fields::PASSWORD_CONFIRM, "abcdef");
        let SubmitOutcome::Accepted(submission) = state.profile.submit() else {
            panic!("profile should validate");
        };

        handle_async_result(
            &mut state,
            AsyncResult::ProfileSaved {
                ticket: submission.ticket,
                result: Ok("Ana Lima".to_string()),
            },
        );

        assert_eq!(state.user().unwrap().name, "Ana Lima");
        assert_eq!(state.profile.value(fields::PASSWORD), "");
        assert_eq!(state.profile.value(fields::NAME), "Ana Lima");
        assert_eq!(state.notification.as_ref().unwrap().level, Level::Success);
    }

    #[test]
    fn test_profile_and_avatar_saves_in_flight_both_apply() {
        let mut state = signed_in();
        state.navigate(Route::Profile);
        state.profile.set_value(fields::NAME, "Ana Lima");
        let SubmitOutcome::Accepted(profile) = state.profile.submit() else {
            panic!("profile should validate");
        };

        state.open_avatar_prompt();
        state.avatar.set_value(fields::AVATAR_PATH, "/tmp/ana.png");
        let SubmitOutcome::Accepted(avatar) = state.avatar.submit() else {
            panic!("avatar path should validate");
        };

        handle_async_result(
            &mut state,
            AsyncResult::ProfileSaved {
                ticket: profile.ticket,
                result: Ok("Ana Lima".to_string()),
            },
        );
        handle_async_result(
            &mut state,
            AsyncResult::AvatarSaved {
                ticket: avatar.ticket,
                result: Ok("ana.png".to_string()),
            },
        );

        let current = state.user().unwrap();
        assert_eq!(current.name, "Ana Lima");
        assert_eq!(current.avatar.as_deref(), Some("ana.png"));
    }

    #[test]
    fn test_registered_exercise_opens_history() {
        let mut state = signed_in();
        state.navigate(Route::Exercise("5".into()));
        state.registering = true;
        let epoch = state.epoch;

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::HistoryRegistered {
                epoch,
                result: Ok(()),
            },
        );

        assert_eq!(state.route(), &Route::History);
        assert!(matches!(cmd, Some(AsyncCommand::FetchHistory { .. })));
    }
}
