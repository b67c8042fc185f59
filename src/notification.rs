//! Transient user notifications (toasts)

/// How long a notification stays on screen, in UI ticks (~50ms each)
pub const NOTIFICATION_TICKS: u16 = 80;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Operation succeeded
    Success,
    /// Local problem the user can fix (e.g. oversized avatar)
    Warning,
    /// Operation failed
    Error,
}

impl Level {
    /// Icon shown in the banner
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }
}

/// A message shown in the top banner until it expires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: Level,
    /// Text to display
    pub title: String,
    ticks_left: u16,
}

impl Notification {
    fn new(level: Level, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            ticks_left: NOTIFICATION_TICKS,
        }
    }

    /// Success notification
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(Level::Success, title)
    }

    /// Warning notification
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(Level::Warning, title)
    }

    /// Error notification
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(Level::Error, title)
    }

    /// Advance one tick; returns `false` once the notification has expired
    pub fn tick(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        self.ticks_left > 0
    }
}
