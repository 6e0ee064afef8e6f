use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::{
    controllers::{ListController, RowFilter},
    ui::theme::Theme,
};

/// Status line under a list: page cursor, row counts against the server
/// total, loading and error state.
pub fn status_line<T, F: RowFilter<T>>(
    list: &ListController<T, F>,
    theme: &Theme,
) -> Line<'static> {
    let buffer = list.buffer();
    let pages = buffer.total_pages.max(1);
    let mut spans = vec![
        Span::styled("Page", Style::default().fg(theme.dim)),
        Span::raw(format!(" {}/{}  ", list.page() + 1, pages)),
        Span::styled("Size", Style::default().fg(theme.dim)),
        Span::raw(format!(" {}  ", list.page_size())),
        Span::styled("Rows", Style::default().fg(theme.dim)),
    ];

    if list.filter().is_active() {
        spans.push(Span::raw(format!(
            " {}/{} of {} (filtered)",
            list.visible_len(),
            buffer.len(),
            buffer.total_elements
        )));
    } else {
        spans.push(Span::raw(format!(
            " {} of {}",
            buffer.len(),
            buffer.total_elements
        )));
    }

    if list.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.warning)));
    }
    if let Some(error) = list.error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(error.to_string(), Style::default().fg(theme.error)));
    }
    Line::from(spans)
}
