use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
};

use super::{field, heading, notice_lines};
use crate::{
    controllers::ProcessDetailsController,
    ui::{components::modal, theme::Theme},
};

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    details: &ProcessDetailsController,
    theme: &Theme,
) {
    let rect = modal::centered_rect(60, 60, area);
    let block = modal::open(frame, rect, "Process details", theme);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let mut status_line = vec![Span::styled(
        format!("{:<16}", "Status"),
        Style::default().fg(theme.dim),
    )];
    match details.status() {
        Some(status) => status_line.push(Span::styled(
            status.as_str(),
            Style::default()
                .fg(theme.status(status))
                .add_modifier(Modifier::BOLD),
        )),
        None => status_line.push(Span::raw("-")),
    }

    let mut lines = vec![
        field("Process", details.process_id().to_string(), theme),
        Line::from(status_line),
    ];
    if let Some(process) = details.details() {
        lines.push(field(
            "File",
            process.file_name.clone().unwrap_or_else(|| "-".to_string()),
            theme,
        ));
        lines.push(field(
            "Processed",
            process
                .processing_date
                .as_ref()
                .map(|ts| ts.display())
                .unwrap_or_else(|| "-".to_string()),
            theme,
        ));
        lines.push(field("Records", process.total_records.to_string(), theme));
        lines.push(field("Successful", process.successful_count.to_string(), theme));
        lines.push(field("Errors", process.error_count.to_string(), theme));
    }
    if let Some(stats) = details.statistics() {
        lines.push(Line::default());
        lines.push(heading("Statistics", theme));
        lines.push(field("Total", stats.total_count.to_string(), theme));
        lines.push(field("Successful", stats.successful_count.to_string(), theme));
        lines.push(field("Errors", stats.error_count.to_string(), theme));
        if let Some(message) = &stats.message {
            lines.push(field("Message", message.clone(), theme));
        }
    }
    if details.is_loading() {
        lines.push(Line::from(Span::styled(
            "Loading…",
            Style::default().fg(theme.warning),
        )));
    }
    if !details.notices().is_empty() {
        lines.push(Line::default());
        lines.extend(notice_lines(details.notices(), theme));
    }
    if let Some(error) = details.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.error),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[0]);

    let percentage = details.success_percentage();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.positive).bg(theme.panel))
        .percent(u16::from(percentage))
        .label(format!("{percentage}% successful"));
    frame.render_widget(gauge, layout[1]);
}
