//! Application state

use crate::api::GymClient;
use crate::config::Config;
use crate::form::Form;
use crate::models::{Exercise, HistoryByDay, User};
use crate::notification::Notification;
use crate::router::{Route, Router};
use crate::session::Session;
use crate::theme::Theme;
use crate::validation::schemas::{self, fields};

use super::async_ops::AsyncCommand;

/// Overlay currently shown on top of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    ThemePicker,
    AvatarPrompt,
}

/// Groups and the exercises of the selected one
#[derive(Debug, Default)]
pub struct HomeState {
    pub groups: Vec<String>,
    pub selected_group: usize,
    pub exercises: Vec<Exercise>,
    pub selected_exercise: usize,
}

impl HomeState {
    pub fn group(&self) -> Option<&str> {
        self.groups.get(self.selected_group).map(String::as_str)
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.selected_exercise)
    }
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Current theme
    pub theme: Theme,
    /// Whether to quit
    pub should_quit: bool,
    /// Current overlay
    pub mode: Mode,
    /// Highlighted row in the theme picker
    pub theme_picker_index: usize,

    /// Signed-in user, if any
    pub session: Session,
    /// Navigation stacks
    pub router: Router,
    /// Bumped on every screen change; fetch results carry the value they were requested under
    pub epoch: u64,
    /// Used for media links only; requests go through the worker
    pub links: GymClient,

    pub sign_in: Form,
    pub sign_up: Form,
    pub profile: Form,
    pub avatar: Form,

    pub home: HomeState,
    pub exercise: Option<Exercise>,
    pub history: Vec<HistoryByDay>,
    pub history_scroll: usize,
    /// Registering the open exercise as done
    pub registering: bool,

    /// Top banner
    pub notification: Option<Notification>,
    /// A fetch is in flight
    pub loading: bool,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, session: Session) -> Self {
        let theme = config.theme;
        let links = GymClient::from_config(&config);
        let router = Router::new(session.is_authenticated());

        Self {
            config,
            theme,
            should_quit: false,
            mode: Mode::Normal,
            theme_picker_index: 0,
            session,
            router,
            epoch: 0,
            links,
            sign_in: Form::new(schemas::sign_in()),
            sign_up: Form::new(schemas::sign_up()),
            profile: Form::new(schemas::profile()),
            avatar: Form::new(schemas::avatar()),
            home: HomeState::default(),
            exercise: None,
            history: Vec::new(),
            history_scroll: 0,
            registering: false,
            notification: None,
            loading: false,
            tick: 0,
        }
    }

    /// Tick for animations and banner expiry
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        // Runs after the frame that displayed any outcome
        for form in [
            &mut self.sign_in,
            &mut self.sign_up,
            &mut self.profile,
            &mut self.avatar,
        ] {
            form.settle();
        }
        if let Some(n) = self.notification.as_mut()
            && !n.tick()
        {
            self.notification = None;
        }
    }

    /// Get current tick
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Show a banner, replacing the current one
    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Screen currently shown
    pub fn route(&self) -> &Route {
        self.router.current()
    }

    /// Signed-in user
    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// The form of the current screen, if it has one
    pub fn active_form(&mut self) -> Option<&mut Form> {
        if self.mode == Mode::AvatarPrompt {
            return Some(&mut self.avatar);
        }
        match self.router.current() {
            Route::SignIn => Some(&mut self.sign_in),
            Route::SignUp => Some(&mut self.sign_up),
            Route::Profile => Some(&mut self.profile),
            Route::Home | Route::Exercise(_) | Route::History => None,
        }
    }

    /// Whether anything is waiting on the worker
    pub fn is_busy(&self) -> bool {
        self.loading
            || self.registering
            || self.sign_in.is_loading()
            || self.sign_up.is_loading()
            || self.profile.is_loading()
            || self.avatar.is_loading()
    }

    /// Push a screen
    pub fn navigate(&mut self, route: Route) -> Option<AsyncCommand> {
        if self.router.navigate(route) {
            self.enter_screen()
        } else {
            None
        }
    }

    /// Jump to a bottom tab
    pub fn switch_tab(&mut self, tab: Route) -> Option<AsyncCommand> {
        if self.router.current() == &tab {
            return None;
        }
        self.router.switch_tab(tab);
        self.enter_screen()
    }

    /// Pop the current screen
    pub fn back(&mut self) -> Option<AsyncCommand> {
        if self.router.back() {
            self.enter_screen()
        } else {
            None
        }
    }

    /// Follow session presence (after sign-in or sign-out)
    pub fn sync_session(&mut self) -> Option<AsyncCommand> {
        if self.router.sync(self.session.is_authenticated()) {
            self.enter_screen()
        } else {
            None
        }
    }

    /// Mount the current screen: fresh forms, stale results dropped, data requested
    pub fn enter_screen(&mut self) -> Option<AsyncCommand> {
        self.epoch += 1;
        self.loading = false;
        self.registering = false;
        self.mode = Mode::Normal;

        match self.router.current().clone() {
            Route::SignIn => {
                // Keep the typed email when coming back from sign-up
                let email = self.sign_in.value(fields::EMAIL).to_string();
                self.sign_in = Form::new(schemas::sign_in()).with_value(fields::EMAIL, &email);
                None
            }
            Route::SignUp => {
                self.sign_up = Form::new(schemas::sign_up());
                None
            }
            Route::Home => {
                self.loading = true;
                Some(AsyncCommand::FetchGroups { epoch: self.epoch })
            }
            Route::Exercise(id) => {
                self.exercise = None;
                self.loading = true;
                Some(AsyncCommand::FetchExercise {
                    epoch: self.epoch,
                    id,
                })
            }
            Route::History => {
                self.history_scroll = 0;
                self.loading = true;
                Some(AsyncCommand::FetchHistory { epoch: self.epoch })
            }
            Route::Profile => {
                self.mount_profile();
                None
            }
        }
    }

    fn mount_profile(&mut self) {
        let (name, email) = self
            .session
            .user()
            .map(|u| (u.name.clone(), u.email.clone()))
            .unwrap_or_default();
        self.profile = Form::new(schemas::profile())
            .with_value(fields::NAME, &name)
            .with_value(fields::EMAIL, &email)
            .read_only(fields::EMAIL);
    }

    /// Open the avatar path prompt
    pub fn open_avatar_prompt(&mut self) {
        self.avatar = Form::new(schemas::avatar());
        self.mode = Mode::AvatarPrompt;
    }

    /// Select a group and request its exercises
    pub fn select_group(&mut self, index: usize) -> Option<AsyncCommand> {
        let group = self.home.groups.get(index)?.clone();
        self.home.selected_group = index;
        self.home.exercises.clear();
        self.home.selected_exercise = 0;
        self.loading = true;
        Some(AsyncCommand::FetchExercises {
            epoch: self.epoch,
            group,
        })
    }

    /// Move selection down in the exercise list
    pub fn select_next_exercise(&mut self) {
        if !self.home.exercises.is_empty() {
            self.home.selected_exercise =
                (self.home.selected_exercise + 1).min(self.home.exercises.len() - 1);
        }
    }

    /// Move selection up in the exercise list
    pub fn select_prev_exercise(&mut self) {
        self.home.selected_exercise = self.home.selected_exercise.saturating_sub(1);
    }

    /// Cycle through themes
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.config.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthSession;

    fn signed_in() -> AppState {
        let mut session = Session::new();
        session.establish(AuthSession {
            user: crate::api::fake::user(),
            token: "t".into(),
            signed_in_at: chrono::Utc::now(),
        });
        AppState::new(Config::default(), session)
    }

    #[test]
    fn test_starts_on_matching_flow() {
        let state = AppState::new(Config::default(), Session::new());
        assert_eq!(state.route(), &Route::SignIn);
        assert_eq!(signed_in().route(), &Route::Home);
    }

    #[test]
    fn test_each_screen_change_bumps_epoch() {
        let mut state = signed_in();
        let first = state.enter_screen();
        assert!(matches!(first, Some(AsyncCommand::FetchGroups { epoch: 1 })));

        let cmd = state.navigate(Route::Exercise("4".into()));
        assert!(matches!(cmd, Some(AsyncCommand::FetchExercise { epoch: 2, .. })));
        assert!(state.loading);
    }

    #[test]
    fn test_tick_returns_finished_form_to_idle() {
        let mut state = AppState::new(Config::default(), Session::new());
        state.enter_screen();
        state.sign_in.submit();
        assert_eq!(state.sign_in.phase(), crate::form::Phase::Invalid);

        state.tick();
        assert_eq!(state.sign_in.phase(), crate::form::Phase::Idle);
        assert!(state.sign_in.error(fields::EMAIL).is_some());
    }

    #[test]
    fn test_profile_prefills_user_and_locks_email() {
        let mut state = signed_in();
        state.navigate(Route::Profile);
        assert_eq!(state.profile.value(fields::NAME), "Ana Souza");
        assert_eq!(state.profile.value(fields::EMAIL), "ana@gym.com");
        assert!(state.profile.is_read_only(fields::EMAIL));
    }

    #[test]
    fn test_sign_out_returns_to_sign_in() {
        let mut state = signed_in();
        state.navigate(Route::Profile);
        state.session.sign_out();
        assert!(state.sync_session().is_none());
        assert_eq!(state.route(), &Route::SignIn);
    }
}
