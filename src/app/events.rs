//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_themes::ThemeName;

use super::async_ops::AsyncCommand;
use super::state::{AppState, Mode};
use crate::api::ProfileUpdate;
use crate::avatar::prepare_avatar;
use crate::form::{Form, SubmitOutcome};
use crate::notification::Notification;
use crate::router::Route;
use crate::theme::Theme;
use crate::validation::schemas::fields;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    match state.mode {
        Mode::ThemePicker => {
            handle_theme_picker_key(state, key);
            return None;
        }
        Mode::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::F(1)
            ) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::AvatarPrompt => return handle_avatar_key(state, key),
        Mode::Normal => {}
    }

    // Function keys work everywhere, even while typing
    match key.code {
        KeyCode::F(1) => {
            state.mode = Mode::Help;
            return None;
        }
        KeyCode::F(2) => {
            open_theme_picker(state);
            return None;
        }
        _ => {}
    }

    match state.route().clone() {
        Route::SignIn => handle_sign_in_key(state, key),
        Route::SignUp => handle_sign_up_key(state, key),
        Route::Profile => handle_profile_key(state, key),
        Route::Home => handle_home_key(state, key),
        Route::Exercise(_) => handle_exercise_key(state, key),
        Route::History => handle_history_key(state, key),
    }
}

/// What a key did to a form
enum FormKey {
    /// Submit was pressed and validation passed
    Submit(crate::form::Submission),
    /// Key was consumed by the form
    Handled,
    /// Not a form key
    Ignored,
}

/// Editing keys shared by every form: typing, focus movement, submit-on-enter
fn edit_form(form: &mut Form, key: KeyEvent) -> FormKey {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Enter if form.is_last_focused() => {
            return match form.submit() {
                SubmitOutcome::Accepted(submission) => FormKey::Submit(submission),
                SubmitOutcome::Invalid | SubmitOutcome::Busy => FormKey::Handled,
            };
        }
        KeyCode::Enter => form.focus_next(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.push_char(c),
        _ => return FormKey::Ignored,
    }
    FormKey::Handled
}

fn handle_sign_in_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('n') {
        return state.navigate(Route::SignUp);
    }
    if key.code == KeyCode::Esc {
        state.should_quit = true;
        return None;
    }

    match edit_form(&mut state.sign_in, key) {
        FormKey::Submit(submission) => Some(AsyncCommand::SignIn {
            email: submission.value(fields::EMAIL).to_string(),
            password: submission.value(fields::PASSWORD).to_string(),
            ticket: submission.ticket,
        }),
        FormKey::Handled | FormKey::Ignored => None,
    }
}

fn handle_sign_up_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.code == KeyCode::Esc {
        return state.back();
    }

    match edit_form(&mut state.sign_up, key) {
        FormKey::Submit(submission) => Some(AsyncCommand::SignUp {
            name: submission.value(fields::NAME).to_string(),
            email: submission.value(fields::EMAIL).to_string(),
            password: submission.value(fields::PASSWORD).to_string(),
            ticket: submission.ticket,
        }),
        FormKey::Handled | FormKey::Ignored => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('u') => {
                state.open_avatar_prompt();
                return None;
            }
            KeyCode::Char('o') => {
                state.session.sign_out();
                let _ = state.sync_session();
                return Some(AsyncCommand::SignOut);
            }
            _ => {}
        }
    }
    if key.code == KeyCode::Esc {
        return state.switch_tab(Route::Home);
    }

    if !state.session.is_authenticated() {
        return None;
    }
    match edit_form(&mut state.profile, key) {
        FormKey::Submit(submission) => Some(AsyncCommand::UpdateProfile {
            update: ProfileUpdate::new(
                submission.value(fields::NAME),
                submission.optional(fields::PASSWORD),
                submission.optional(fields::OLD_PASSWORD),
            ),
            ticket: submission.ticket,
        }),
        FormKey::Handled | FormKey::Ignored => None,
    }
}

fn handle_avatar_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.code == KeyCode::Esc {
        if !state.avatar.is_loading() {
            state.mode = Mode::Normal;
        }
        return None;
    }

    let FormKey::Submit(submission) = edit_form(&mut state.avatar, key) else {
        return None;
    };
    let Some(user) = state.user().cloned() else {
        state.avatar.abort(submission.ticket);
        return None;
    };

    // Checked locally: an unusable file never reaches the network
    let path = std::path::PathBuf::from(submission.value(fields::AVATAR_PATH));
    match prepare_avatar(&path, &user.name) {
        Ok(upload) => Some(AsyncCommand::UpdateAvatar {
            ticket: submission.ticket,
            upload,
        }),
        Err(e) => {
            state.avatar.abort(submission.ticket);
            state.notify(Notification::warning(e.to_string()));
            None
        }
    }
}

/// Keys shared by the authenticated, non-form screens
fn handle_tab_key(state: &mut AppState, key: KeyEvent) -> Option<Option<AsyncCommand>> {
    let cmd = match key.code {
        KeyCode::Char('q') => {
            state.should_quit = true;
            None
        }
        KeyCode::Char('?') => {
            state.mode = Mode::Help;
            None
        }
        KeyCode::Char('t') => {
            open_theme_picker(state);
            None
        }
        KeyCode::Char('1') => state.switch_tab(Route::Home),
        KeyCode::Char('2') => state.switch_tab(Route::History),
        KeyCode::Char('3') => state.switch_tab(Route::Profile),
        _ => return None,
    };
    Some(cmd)
}

fn handle_home_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if let Some(cmd) = handle_tab_key(state, key) {
        return cmd;
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            let index = state.home.selected_group.checked_sub(1)?;
            state.select_group(index)
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let index = state.home.selected_group + 1;
            state.select_group(index)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.select_next_exercise();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.select_prev_exercise();
            None
        }
        KeyCode::Enter => {
            let id = state.home.exercise()?.id.clone();
            state.navigate(Route::Exercise(id))
        }
        KeyCode::Char('r') => state.enter_screen(),
        _ => None,
    }
}

fn handle_exercise_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if let Some(cmd) = handle_tab_key(state, key) {
        return cmd;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Backspace => state.back(),
        KeyCode::Enter | KeyCode::Char('d') => {
            if state.registering {
                return None;
            }
            let exercise_id = state.exercise.as_ref()?.id.clone();
            state.registering = true;
            Some(AsyncCommand::RegisterHistory {
                epoch: state.epoch,
                exercise_id,
            })
        }
        KeyCode::Char('o') => {
            let exercise = state.exercise.as_ref()?;
            if exercise.demo.is_empty() {
                return None;
            }
            let url = state.links.demo_url(&exercise.demo);
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "could not open demo");
                state.notify(Notification::warning("Could not open the demo in a browser."));
            }
            None
        }
        _ => None,
    }
}

fn handle_history_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if let Some(cmd) = handle_tab_key(state, key) {
        return cmd;
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            state.history_scroll = state.history_scroll.saturating_add(1);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.history_scroll = state.history_scroll.saturating_sub(1);
            None
        }
        KeyCode::Char('g') => {
            state.history_scroll = 0;
            None
        }
        KeyCode::Char('r') => state.enter_screen(),
        _ => None,
    }
}

fn open_theme_picker(state: &mut AppState) {
    state.theme_picker_index = ThemeName::all()
        .iter()
        .position(|t| *t == state.theme.0)
        .unwrap_or(0);
    state.mode = Mode::ThemePicker;
}

fn handle_theme_picker_key(state: &mut AppState, key: KeyEvent) {
    let themes = ThemeName::all();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Normal;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.theme_picker_index = state
                .theme_picker_index
                .checked_sub(1)
                .unwrap_or(themes.len().saturating_sub(1));
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.theme_picker_index = (state.theme_picker_index + 1) % themes.len().max(1);
        }
        KeyCode::Enter => {
            if let Some(name) = themes.get(state.theme_picker_index) {
                state.set_theme(Theme(*name));
            }
            state.mode = Mode::Normal;
        }
        _ => {}
    }
}
