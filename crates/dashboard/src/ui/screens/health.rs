use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use api_types::health::ProbeResponse;

use crate::{controllers::HealthMonitor, ui::theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, monitor: &HealthMonitor, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(4)])
        .split(area);

    let poller = monitor.poller();
    let mut lines = Vec::new();
    match poller.status() {
        Some(health) => {
            let color = if health.is_up() {
                theme.positive
            } else {
                theme.error
            };
            lines.push(Line::from(vec![
                Span::styled("Status   ", Style::default().fg(theme.dim)),
                Span::styled(
                    health.status.as_str(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(field("Service  ", &health.service, theme));
            lines.push(field("Version  ", &health.version, theme));
            let reported = health
                .timestamp
                .as_ref()
                .map(|ts| ts.display())
                .unwrap_or_else(|| "-".to_string());
            lines.push(field("Reported ", &reported, theme));
            for (name, value) in &health.checks {
                let color = if value.eq_ignore_ascii_case("UP") {
                    theme.positive
                } else {
                    theme.error
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {name:<9}"), Style::default().fg(theme.dim)),
                    Span::styled(value.clone(), Style::default().fg(color)),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Checking…",
            Style::default().fg(theme.dim),
        ))),
    }

    let refreshed = poller
        .last_refresh()
        .map(|ts| ts.display())
        .unwrap_or_else(|| "-".to_string());
    let mut title = format!(
        " Health (every {}s, last {refreshed}) ",
        poller.interval().as_secs()
    );
    if poller.is_loading() {
        title.push_str("… ");
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        layout[0],
    );

    let probes = vec![
        probe_line("Readiness", monitor.readiness(), theme),
        probe_line("Liveness ", monitor.liveness(), theme),
    ];
    frame.render_widget(
        Paragraph::new(probes).block(Block::default().borders(Borders::ALL).title(" Probes ")),
        layout[1],
    );
}

fn field(label: &str, value: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(label.to_string(), Style::default().fg(theme.dim)),
        Span::raw(value.to_string()),
    ])
}

fn probe_line(label: &str, probe: Option<&ProbeResponse>, theme: &Theme) -> Line<'static> {
    let Some(probe) = probe else {
        return field(label, "-", theme);
    };
    let healthy = matches!(probe.status.as_str(), "READY" | "ALIVE" | "UP");
    let color = if healthy { theme.positive } else { theme.error };
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(theme.dim)),
        Span::styled(probe.status.clone(), Style::default().fg(color)),
    ])
}
