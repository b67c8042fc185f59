//! Navigation between screens
//!
//! Two flows share one router: the sign-in flow while nobody is signed in and
//! the app flow once a session exists. Each keeps its own back stack, and
//! [`Router::sync`] swaps between them whenever session presence changes.

/// A screen the app can show
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign in (unauthenticated root)
    SignIn,
    /// Create an account
    SignUp,
    /// Groups and exercises (authenticated root)
    Home,
    /// One exercise, by id
    Exercise(String),
    /// Completed exercises by day
    History,
    /// Profile and password
    Profile,
}

impl Route {
    /// Whether this route belongs to the authenticated flow
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, Self::SignIn | Self::SignUp)
    }

    /// Whether this route is a bottom tab of the authenticated flow
    pub const fn is_tab(&self) -> bool {
        matches!(self, Self::Home | Self::History | Self::Profile)
    }

    /// Title for the header
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Create account",
            Self::Home => "Home",
            Self::Exercise(_) => "Exercise",
            Self::History => "History",
            Self::Profile => "Profile",
        }
    }
}

/// Back stacks for both flows
#[derive(Debug, Clone)]
pub struct Router {
    authenticated: bool,
    stack: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Router {
    /// Router rooted at the flow matching `authenticated`
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated,
            stack: vec![Self::root(authenticated)],
        }
    }

    const fn root(authenticated: bool) -> Route {
        if authenticated { Route::Home } else { Route::SignIn }
    }

    /// Screen currently shown
    pub fn current(&self) -> &Route {
        // The stack always holds at least its root
        self.stack.last().unwrap_or(&Route::SignIn)
    }

    /// Depth of the back stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Switch flows when session presence changed; returns `true` on a switch
    pub fn sync(&mut self, authenticated: bool) -> bool {
        if self.authenticated == authenticated {
            return false;
        }
        tracing::debug!(authenticated, "switching navigation flow");
        *self = Self::new(authenticated);
        true
    }

    /// Push `route`; routes from the other flow are refused
    pub fn navigate(&mut self, route: Route) -> bool {
        if route.requires_auth() != self.authenticated {
            tracing::warn!(?route, "refusing navigation across flows");
            return false;
        }
        if self.current() == &route {
            return false;
        }
        if route.is_tab() {
            self.switch_tab(route);
        } else {
            self.stack.push(route);
        }
        true
    }

    /// Pop one screen; the root is never popped
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Jump to a tab, resetting the stack to the app root
    pub fn switch_tab(&mut self, tab: Route) {
        if !self.authenticated || !tab.is_tab() {
            return;
        }
        self.stack.truncate(1);
        if tab != Route::Home {
            self.stack.push(tab);
        }
    }
}
