//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use ratatui_themes::ThemeName;
use unicode_width::UnicodeWidthStr;

use super::state::{AppState, Mode};
use crate::form::Form;
use crate::router::Route;
use crate::theme::ThemeColors;
use crate::validation::schemas::fields;

/// Header wordmark
const LOGO: &str = "IGNITE GYM";

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Height of one input: bordered box plus the error line under it
const INPUT_HEIGHT: u16 = 4;

/// Label and masking for each form field
fn field_label(field: &str) -> (&'static str, bool) {
    match field {
        fields::NAME => ("Name", false),
        fields::EMAIL => ("E-mail", false),
        fields::PASSWORD => ("Password", true),
        fields::PASSWORD_CONFIRM => ("Confirm password", true),
        fields::OLD_PASSWORD => ("Current password", true),
        fields::AVATAR_PATH => ("Image path", false),
        _ => ("", false),
    }
}

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    let banner_height = state.notification.as_ref().map_or(0, |n| {
        let width = usize::from(area.width.saturating_sub(6)).max(1);
        textwrap::wrap(&n.title, width).len() as u16
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Screen
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_banner(frame, state, &colors, chunks[0]);
    render_header(frame, state, &colors, chunks[1]);

    match state.route() {
        Route::SignIn => render_form_screen(
            frame,
            &state.sign_in,
            &colors,
            chunks[2],
            "Access your account",
            "Sign in",
        ),
        Route::SignUp => render_form_screen(
            frame,
            &state.sign_up,
            &colors,
            chunks[2],
            "Create your account",
            "Create and access",
        ),
        Route::Home => render_home(frame, state, &colors, chunks[2]),
        Route::Exercise(_) => render_exercise(frame, state, &colors, chunks[2]),
        Route::History => render_history(frame, state, &colors, chunks[2]),
        Route::Profile => render_profile(frame, state, &colors, chunks[2]),
    }

    render_status_bar(frame, state, &colors, chunks[3]);

    // Render modal dialogs
    match state.mode {
        Mode::Help => render_help_popup(frame, &colors),
        Mode::ThemePicker => render_theme_picker(frame, state, &colors),
        Mode::AvatarPrompt => render_avatar_prompt(frame, state, &colors),
        Mode::Normal => {}
    }
}

fn render_banner(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let Some(notification) = &state.notification else {
        return;
    };
    let style = colors.level(notification.level);
    let banner = Paragraph::new(format!(" {}  {}", notification.level.icon(), notification.title))
        .style(style)
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}

fn render_header(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(colors.block());

    let Some(user) = state.user() else {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {LOGO} "), colors.logo()),
            Span::styled("  Train your mind and your body", colors.text_dim()),
        ]))
        .block(block);
        frame.render_widget(title, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(40)])
        .split(area);

    let tabs = [Route::Home, Route::History, Route::Profile];
    let selected = tabs
        .iter()
        .position(|tab| tab == state.route())
        .unwrap_or(0);
    let titles: Vec<Line> = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(block.clone().title(Span::styled(format!(" {LOGO} "), colors.logo())))
        .select(selected)
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider("│");
    frame.render_widget(tabs, chunks[0]);

    let greeting = Paragraph::new(Line::from(vec![
        Span::styled("Hello, ", colors.text_dim()),
        Span::styled(user.first_name(), colors.heading()),
        Span::raw(" "),
    ]))
    .alignment(Alignment::Right)
    .block(block);
    frame.render_widget(greeting, chunks[1]);
}

fn render_form_screen(
    frame: &mut Frame,
    form: &Form,
    colors: &ThemeColors,
    area: Rect,
    heading: &str,
    button: &str,
) {
    let inputs = form.fields().len() as u16;
    let height = 2 + inputs * INPUT_HEIGHT + 3;
    let column = centered_column(56, height, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(inputs * INPUT_HEIGHT),
            Constraint::Length(3),
        ])
        .split(column);

    frame.render_widget(
        Paragraph::new(heading)
            .style(colors.heading())
            .alignment(Alignment::Center),
        chunks[0],
    );
    render_inputs(frame, form, colors, chunks[1]);
    render_button(frame, form, colors, chunks[2], button);
}

/// Every field of `form`, with inline errors and the cursor on the focused one
fn render_inputs(frame: &mut Frame, form: &Form, colors: &ThemeColors, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(INPUT_HEIGHT); form.fields().len()])
        .split(area);

    for (field, row) in form.fields().iter().zip(rows.iter()) {
        let (label, secure) = field_label(field);
        let focused = form.focused() == *field;
        let error = form.error(field);
        let read_only = form.is_read_only(field);

        let raw = form.value(field);
        let shown = if secure {
            "•".repeat(raw.chars().count())
        } else {
            raw.to_string()
        };

        let box_area = Rect { height: 3, ..*row };
        let text_style = if read_only {
            colors.input_read_only()
        } else {
            colors.text().bg(colors.bg_panel)
        };
        let input = Paragraph::new(shown.as_str()).style(text_style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.input_border(focused, error.is_some()))
                .title(Span::styled(format!(" {label} "), colors.text_dim())),
        );
        frame.render_widget(input, box_area);

        if let Some(message) = error {
            let error_area = Rect {
                y: row.y + 3,
                height: 1,
                ..*row
            };
            frame.render_widget(
                Paragraph::new(format!(" {message}")).style(colors.field_error()),
                error_area,
            );
        }

        if focused && !read_only {
            let offset = u16::try_from(shown.width()).unwrap_or(u16::MAX);
            let max_x = box_area.x + box_area.width.saturating_sub(2);
            frame.set_cursor_position((
                (box_area.x + 1).saturating_add(offset).min(max_x),
                box_area.y + 1,
            ));
        }
    }
}

fn render_button(frame: &mut Frame, form: &Form, colors: &ThemeColors, area: Rect, label: &str) {
    let loading = form.is_loading();
    let text = if loading { "…" } else { label };
    let button = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(colors.button(loading))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block()),
        );
    frame.render_widget(button, area);
}

fn render_home(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let groups: Vec<Line> = state
        .home
        .groups
        .iter()
        .map(|g| Line::from(g.to_uppercase()))
        .collect();
    let tabs = Tabs::new(groups)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(" Muscle groups "),
        )
        .select(state.home.selected_group)
        .style(colors.tab())
        .highlight_style(colors.tab_active());
    frame.render_widget(tabs, chunks[0]);

    let items: Vec<ListItem> = state
        .home
        .exercises
        .iter()
        .map(|exercise| {
            ListItem::new(vec![
                Line::from(Span::styled(exercise.name.clone(), colors.heading())),
                Line::from(Span::styled(exercise.summary(), colors.text_dim())),
            ])
        })
        .collect();

    let title = format!(" Exercises ({}) ", state.home.exercises.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(title);

    if items.is_empty() && !state.loading {
        let empty = Paragraph::new("No exercises in this group.")
            .style(colors.text_dim())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selected())
        .highlight_symbol("▸ ");
    let mut list_state = ListState::default().with_selected(Some(state.home.selected_exercise));
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn render_exercise(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(" Exercise ");

    let Some(exercise) = &state.exercise else {
        frame.render_widget(
            Paragraph::new("Loading exercise…")
                .style(colors.text_dim())
                .block(block),
            area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", exercise.name), colors.heading())),
        Line::from(Span::styled(
            format!("  {}", exercise.group.to_uppercase()),
            colors.text_primary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Series        ", colors.text_dim()),
            Span::styled(exercise.series.to_string(), colors.text()),
        ]),
        Line::from(vec![
            Span::styled("  Repetitions   ", colors.text_dim()),
            Span::styled(exercise.repetitions.to_string(), colors.text()),
        ]),
    ];
    if !exercise.demo.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Demo          ", colors.text_dim()),
            Span::styled(state.links.demo_url(&exercise.demo), colors.text_primary()),
        ]));
    }
    if !exercise.thumb.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Thumbnail     ", colors.text_dim()),
            Span::styled(state.links.thumb_url(&exercise.thumb), colors.text_dim()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(if state.registering {
        Span::styled("  Registering…", colors.text_dim())
    } else {
        Span::styled("  Press Enter to mark as done", colors.key_hint())
    }));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_history(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(" Exercise history ");

    if state.history.is_empty() {
        let text = if state.loading {
            "Loading history…"
        } else {
            "No exercises registered yet. Let's work out today?"
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(colors.text_dim())
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let mut lines = Vec::new();
    for day in &state.history {
        lines.push(Line::from(Span::styled(format!(" {}", day.title), colors.heading())));
        for entry in &day.data {
            lines.push(Line::from(vec![
                Span::styled(format!("   {}  ", entry.hour), colors.text_dim()),
                Span::styled(format!("{:<12}", entry.group.to_uppercase()), colors.text_primary()),
                Span::styled(entry.name.clone(), colors.text()),
            ]));
        }
        lines.push(Line::from(""));
    }

    let scroll = u16::try_from(state.history_scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn render_profile(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let avatar = state
        .user()
        .and_then(|u| u.avatar.as_deref())
        .map_or_else(
            || "No photo yet".to_string(),
            |file| state.links.avatar_url(file),
        );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Photo: ", colors.text_dim()),
            Span::styled(avatar, colors.text()),
            Span::styled("   Ctrl+U", colors.key_hint()),
            Span::styled(" change", colors.text_dim()),
        ])),
        chunks[0],
    );
    render_form_screen(
        frame,
        &state.profile,
        colors,
        chunks[1],
        "Change password (optional)",
        "Update",
    );
}

fn render_status_bar(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let mut content = vec![Span::raw(" ")];
    if state.is_busy() {
        let frame_idx = (state.current_tick() / 2) as usize % SPINNER.len();
        content.push(Span::styled(format!("{} ", SPINNER[frame_idx]), colors.text_primary()));
    }

    let hints: &[(&str, &str)] = match state.route() {
        Route::SignIn => &[
            ("Tab", "next field"),
            ("Enter", "sign in"),
            ("Ctrl+N", "create account"),
            ("F1", "help"),
            ("Esc", "quit"),
        ],
        Route::SignUp => &[
            ("Tab", "next field"),
            ("Enter", "submit"),
            ("F1", "help"),
            ("Esc", "back"),
        ],
        Route::Profile => &[
            ("Tab", "next field"),
            ("Enter", "save"),
            ("Ctrl+U", "avatar"),
            ("Ctrl+O", "sign out"),
            ("Esc", "home"),
        ],
        Route::Home => &[
            ("←/→", "group"),
            ("↑/↓", "exercise"),
            ("Enter", "open"),
            ("1-3", "tabs"),
            ("?", "help"),
            ("q", "quit"),
        ],
        Route::Exercise(_) => &[
            ("Enter", "mark as done"),
            ("o", "demo"),
            ("Esc", "back"),
            ("q", "quit"),
        ],
        Route::History => &[("↑/↓", "scroll"), ("r", "refresh"), ("1-3", "tabs"), ("q", "quit")],
    };

    for (key, action) in hints {
        content.push(Span::styled(*key, colors.key_hint()));
        content.push(Span::styled(format!(": {action}  "), colors.text_dim()));
    }

    let status = Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_panel));
    frame.render_widget(status, area);
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            colors.text_primary().add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |key: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<17}"), colors.key_hint()),
            Span::styled(action, colors.text()),
        ])
    };

    let help_content = vec![
        Line::from(""),
        section("Forms"),
        entry("Tab / ↓", "Next field"),
        entry("Shift+Tab / ↑", "Previous field"),
        entry("Enter", "Next field, submit on the last one"),
        entry("Ctrl+N", "Create an account (sign-in screen)"),
        entry("Ctrl+U", "Change avatar (profile)"),
        entry("Ctrl+O", "Sign out (profile)"),
        Line::from(""),
        section("Screens"),
        entry("1 / 2 / 3", "Home / History / Profile"),
        entry("←/→ or h/l", "Previous/next muscle group"),
        entry("↑/↓ or j/k", "Move selection"),
        entry("Enter", "Open exercise / mark as done"),
        entry("o", "Open exercise demo in browser"),
        entry("r", "Reload"),
        entry("Esc", "Back"),
        Line::from(""),
        section("General"),
        entry("F1 or ?", "Toggle this help"),
        entry("F2 or t", "Theme selector"),
        entry("q / Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_dim()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" to close", colors.text_dim()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block_focus())
                .style(Style::default().bg(colors.bg_panel))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.text_primary()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

fn render_theme_picker(frame: &mut Frame, state: &AppState, colors: &ThemeColors) {
    let popup_area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let themes = ThemeName::all();
    let items: Vec<ListItem> = themes
        .iter()
        .enumerate()
        .map(|(i, theme_name)| {
            let palette = theme_name.palette();
            let selected = i == state.theme_picker_index;
            let label = format!(
                "  {} {} ",
                if selected { "▸" } else { " " },
                theme_name.display_name()
            );
            let style = if selected {
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg).bg(colors.bg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(label, style),
                Span::styled("█", Style::default().fg(palette.accent).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.success).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.error).bg(colors.bg)),
            ]))
        })
        .collect();

    let theme_list = List::new(items).style(Style::default().bg(colors.bg)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.primary))
            .border_type(BorderType::Rounded)
            .title(format!(
                " 🎨 Select Theme ({}/{}) ",
                state.theme_picker_index + 1,
                themes.len()
            ))
            .title_bottom(Line::from(" ↑↓ navigate │ ↵ apply │ Esc cancel ").centered()),
    );

    frame.render_widget(theme_list, popup_area);
}

fn render_avatar_prompt(frame: &mut Frame, state: &AppState, colors: &ThemeColors) {
    let popup_area = centered_column(60, INPUT_HEIGHT + 6, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .style(Style::default().bg(colors.bg))
        .title(" Change avatar ")
        .title_bottom(Line::from(" ↵ upload │ Esc cancel ").centered());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(3),
        ])
        .split(inner);
    frame.render_widget(
        Paragraph::new(" PNG or JPEG, up to 5MB").style(colors.text_dim()),
        chunks[0],
    );
    render_inputs(frame, &state.avatar, colors, chunks[1]);
    render_button(frame, &state.avatar, colors, chunks[2], "Upload");
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

/// Fixed-size column centered in `r`, clamped to fit
fn centered_column(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
