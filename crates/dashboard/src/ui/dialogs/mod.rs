pub mod client_details;
pub mod process_details;
pub mod process_info;

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::ui::theme::Theme;

fn field(label: &str, value: impl Into<String>, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), Style::default().fg(theme.dim)),
        Span::raw(value.into()),
    ])
}

fn heading(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme.accent),
    ))
}

fn notice_lines(notices: &[String], theme: &Theme) -> Vec<Line<'static>> {
    notices
        .iter()
        .map(|notice| {
            Line::from(Span::styled(
                format!("! {notice}"),
                Style::default().fg(theme.warning),
            ))
        })
        .collect()
}

fn money(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}
