//! Theme configuration and colors.
//!
//! Palettes come from the `ratatui-themes` crate; [`ThemeColors`] derives the
//! handful of UI roles the screens need (inputs, banners, tabs) from them.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

use crate::notification::Level;

/// Theme wrapper around `ThemeName` from ratatui-themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Get the next theme in rotation
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.next())
    }

    /// Get the previous theme in rotation
    #[must_use]
    pub fn prev(&self) -> Self {
        Self(self.0.prev())
    }

    /// Get the display name for the theme.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Get the color palette for this theme
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Colors for each UI role.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Screen background
    pub bg: Color,
    /// Input and card background
    pub bg_panel: Color,
    /// Primary text
    pub fg: Color,
    /// Secondary text, hints, placeholders
    pub fg_dim: Color,
    /// Brand accent (buttons, active tab, logo)
    pub primary: Color,
    /// Second accent
    pub secondary: Color,
    /// Success banner
    pub success: Color,
    /// Warning banner
    pub warning: Color,
    /// Error banner and field errors
    pub error: Color,
    /// Unfocused border
    pub border: Color,
    /// Focused border
    pub border_focus: Color,
    /// Selected list row
    pub selection: Color,
}

impl ThemeColors {
    /// Create `ThemeColors` from a `ThemePalette`
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_panel: lighten(p.bg, 12),
            fg: p.fg,
            fg_dim: p.muted,
            primary: p.accent,
            secondary: p.secondary,
            success: p.success,
            warning: p.warning,
            error: p.error,
            border: p.muted,
            border_focus: p.accent,
            selection: p.selection,
        }
    }

    /// Default text style
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Dimmed text style
    #[must_use]
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Accent text style
    #[must_use]
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Heading style
    #[must_use]
    pub fn heading(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    /// Banner style for a notification level
    #[must_use]
    pub fn level(&self, level: Level) -> Style {
        let color = match level {
            Level::Success => self.success,
            Level::Warning => self.warning,
            Level::Error => self.error,
        };
        Style::default()
            .fg(self.bg)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    }

    /// Border of an input box
    #[must_use]
    pub fn input_border(&self, focused: bool, invalid: bool) -> Style {
        let color = if invalid {
            self.error
        } else if focused {
            self.border_focus
        } else {
            self.border
        };
        Style::default().fg(color).bg(self.bg_panel)
    }

    /// Read-only input text
    #[must_use]
    pub fn input_read_only(&self) -> Style {
        Style::default()
            .fg(self.fg_dim)
            .bg(self.bg_panel)
            .add_modifier(Modifier::ITALIC)
    }

    /// Inline field error text
    #[must_use]
    pub fn field_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Block border style
    #[must_use]
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused block border style
    #[must_use]
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.border_focus)
    }

    /// Submit button; dimmed while a request is in flight
    #[must_use]
    pub fn button(&self, loading: bool) -> Style {
        if loading {
            Style::default().fg(self.fg_dim).bg(self.bg_panel)
        } else {
            Style::default()
                .fg(self.bg)
                .bg(self.primary)
                .add_modifier(Modifier::BOLD)
        }
    }

    /// Selected item style
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Tab style
    #[must_use]
    pub fn tab(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Active tab style
    #[must_use]
    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    /// Key hint style (for shortcuts)
    #[must_use]
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }

    /// Logo style
    #[must_use]
    pub fn logo(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }
}

fn lighten(color: Color, amount: u8) -> Color {
    if let Color::Rgb(r, g, b) = color {
        Color::Rgb(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        )
    } else {
        color
    }
}
