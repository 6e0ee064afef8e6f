pub mod components;
pub mod dialogs;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, Dialog, InputMode, Screen, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

use components::hints::{KeyHint, hint_separator, hints_to_spans};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.text)),
        area,
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Screen
            Constraint::Length(1), // Prompt or hints
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], Section::of(&state.route), &theme);

    match &state.screen {
        Screen::Dashboard(dashboard) => {
            screens::dashboard::render(frame, layout[2], dashboard, &theme)
        }
        Screen::Clients(list) => {
            let title = format!(
                " Clients of process {} ",
                list.process_id().unwrap_or("?")
            );
            screens::clients::render(frame, layout[2], list, &title, &theme)
        }
        Screen::AllClients(list) => {
            screens::clients::render(frame, layout[2], list, " All clients ", &theme)
        }
        Screen::Errors(list) => screens::errors::render(frame, layout[2], list, &theme),
        Screen::Health(monitor) => screens::health::render(frame, layout[2], monitor, &theme),
    }

    for dialog in &state.dialogs {
        match dialog {
            Dialog::ClientDetails(details) => {
                dialogs::client_details::render(frame, area, details, &theme)
            }
            Dialog::ProcessDetails(details) => {
                dialogs::process_details::render(frame, area, details, &theme)
            }
            Dialog::ProcessInfo(info) => {
                let filtering = state.input == InputMode::DialogFilter;
                dialogs::process_info::render(frame, area, info, filtering, &theme)
            }
        }
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let health = state.header_health.status();
    let (label, style) = match health {
        Some(health) if health.is_up() => ("UP", Style::default().fg(theme.positive)),
        Some(_) => ("DOWN", Style::default().fg(theme.error)),
        None => ("...", Style::default().fg(theme.dim)),
    };
    let refreshed = state
        .header_health
        .last_refresh()
        .map(|ts| ts.display())
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled("Backend", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Route", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.route)),
        Span::styled("Checked", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refreshed}  ")),
        Span::styled(label, style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if let InputMode::Editing { target, buffer } = &state.input {
        let line = Line::from(vec![
            Span::styled(target.label(), Style::default().fg(theme.accent)),
            Span::raw(format!(": {buffer}_")),
            hint_separator(theme),
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" apply  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut parts = Vec::new();
    if state.dialogs.is_empty() {
        parts.extend(components::tabs::tab_shortcuts(theme));
        parts.push(hint_separator(theme));
    }
    parts.extend(hints_to_spans(&context_hints(state), theme));
    parts.push(hint_separator(theme));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(if state.dialogs.is_empty() { " quit" } else { " close" }));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn context_hints(state: &AppState) -> Vec<KeyHint> {
    if let Some(dialog) = state.dialogs.last() {
        return match dialog {
            Dialog::ClientDetails(_) => vec![KeyHint::new("Esc", "close")],
            Dialog::ProcessDetails(_) => vec![
                KeyHint::new("s", "status"),
                KeyHint::new("r", "reload"),
                KeyHint::new("i", "info"),
                KeyHint::new("c", "clients"),
                KeyHint::new("e", "errors"),
            ],
            Dialog::ProcessInfo(_) if state.input == InputMode::DialogFilter => vec![
                KeyHint::new("type", "filter"),
                KeyHint::new("Tab", "field"),
                KeyHint::new("Enter", "done"),
            ],
            Dialog::ProcessInfo(_) => vec![
                KeyHint::new("Tab", "pane"),
                KeyHint::new("/", "filter"),
                KeyHint::new("n/p", "page"),
                KeyHint::new("Enter", "client"),
            ],
        };
    }

    let mut hints = match &state.screen {
        Screen::Dashboard(_) => vec![
            KeyHint::new("o", "pick file"),
            KeyHint::new("u", "upload"),
            KeyHint::new("Enter", "details"),
            KeyHint::new("i", "info"),
            KeyHint::new("c/e", "clients/errors"),
            KeyHint::new("v", "first client"),
            KeyHint::new("s", "status"),
            KeyHint::new("/", "file"),
        ],
        Screen::Clients(_) => vec![
            KeyHint::new("Enter", "details"),
            KeyHint::new("/", "name"),
            KeyHint::new("c", "code"),
            KeyHint::new("Esc", "back"),
        ],
        Screen::AllClients(_) => vec![
            KeyHint::new("Enter", "details"),
            KeyHint::new("/", "name"),
            KeyHint::new("c", "code"),
            KeyHint::new("f", "find code"),
            KeyHint::new("i", "find id"),
        ],
        Screen::Errors(_) => vec![KeyHint::new("/", "id type"), KeyHint::new("Esc", "back")],
        Screen::Health(_) => vec![KeyHint::new("r", "refresh")],
    };
    if !matches!(state.screen, Screen::Health(_)) {
        hints.extend(components::hints::PAGING);
    }
    hints.push(KeyHint::new("g", "go to"));
    hints
}
