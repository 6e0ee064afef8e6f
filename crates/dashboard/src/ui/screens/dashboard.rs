use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::DashboardState,
    controllers::upload::{NoticeKind, human_size},
    ui::{components::pager, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &DashboardState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    render_upload(frame, layout[0], state, theme);
    render_history(frame, layout[1], state, theme);
}

fn render_upload(frame: &mut Frame<'_>, area: Rect, state: &DashboardState, theme: &Theme) {
    let upload = &state.upload;
    let file = match upload.selected() {
        Some(file) => Line::from(vec![
            Span::styled("File", Style::default().fg(theme.dim)),
            Span::raw(format!(": {} ({})", file.name, human_size(file.size))),
        ]),
        None => Line::from(Span::styled(
            format!(
                "No file selected. Press o to pick a .txt file (max {}).",
                human_size(upload.max_bytes())
            ),
            Style::default().fg(theme.dim),
        )),
    };

    let status = if upload.is_uploading() {
        Line::from(Span::styled("Uploading…", Style::default().fg(theme.warning)))
    } else {
        match upload.notice() {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Success => theme.positive,
                    NoticeKind::Error => theme.error,
                };
                Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
            }
            None => Line::default(),
        }
    };

    let block = Block::default().borders(Borders::ALL).title(" Upload clients ");
    frame.render_widget(Paragraph::new(vec![file, status]).block(block), area);
}

fn render_history(frame: &mut Frame<'_>, area: Rect, state: &DashboardState, theme: &Theme) {
    let history = &state.history;
    let filter = history.filter();
    let mut title = " Process history ".to_string();
    if !filter.status.is_empty() {
        title.push_str(&format!("[status: {}] ", filter.status));
    }
    if !filter.file_name.is_empty() {
        title.push_str(&format!("[file: {}] ", filter.file_name));
    }

    let rows = history.visible().into_iter().map(|process| {
        let date = process
            .processing_date
            .as_ref()
            .map(|ts| ts.display())
            .unwrap_or_else(|| "-".to_string());
        Row::new(vec![
            Cell::from(process.process_id.clone()),
            Cell::from(process.file_name.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(process.status.as_str())
                .style(Style::default().fg(theme.status(process.status))),
            Cell::from(process.total_records.to_string()),
            Cell::from(process.successful_count.to_string()),
            Cell::from(process.error_count.to_string()),
            Cell::from(date),
        ])
    });

    let header = Row::new(vec!["Process", "File", "Status", "Total", "Ok", "Errors", "Date"])
        .style(Style::default().fg(theme.dim));
    let widths = [
        Constraint::Length(38),
        Constraint::Min(16),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(17),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    let mut table_state = TableState::default();
    if history.visible_len() > 0 {
        table_state.select(Some(history.selected_index()));
    }
    frame.render_stateful_widget(table, layout[0], &mut table_state);
    frame.render_widget(Paragraph::new(pager::status_line(history, theme)), layout[1]);
}
