use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use api_types::bulk_load::BulkLoadError;

use crate::{
    controllers::{ErrorFilter, ListController},
    ui::{components::pager, theme::Theme},
};

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    list: &ListController<BulkLoadError, ErrorFilter>,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let mut title = format!(
        " Validation errors of process {} ",
        list.process_id().unwrap_or("?")
    );
    if !list.filter().id_type.is_empty() {
        title.push_str(&format!("[id type: {}] ", list.filter().id_type));
    }

    let table = error_table(&list.visible(), theme)
        .block(Block::default().borders(Borders::ALL).title(title));
    let mut table_state = TableState::default();
    if list.visible_len() > 0 {
        table_state.select(Some(list.selected_index()));
    }
    frame.render_stateful_widget(table, layout[0], &mut table_state);
    frame.render_widget(Paragraph::new(pager::status_line(list, theme)), layout[1]);
}

pub fn error_table<'a>(errors: &[&BulkLoadError], theme: &Theme) -> Table<'a> {
    let rows: Vec<Row<'a>> = errors
        .iter()
        .map(|error| {
            let id = match (&error.id_type, &error.id_number) {
                (Some(id_type), Some(number)) => format!("{id_type} {number}"),
                (Some(id_type), None) => id_type.clone(),
                _ => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(error.line_number.to_string()),
                Cell::from(error.error_type.clone().unwrap_or_default()),
                Cell::from(error.field_name.clone().unwrap_or_default()),
                Cell::from(id),
                Cell::from(error.error_message.clone())
                    .style(Style::default().fg(theme.error)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Line", "Type", "Field", "Id", "Message"])
        .style(Style::default().fg(theme.dim));
    let widths = [
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Min(20),
    ];

    Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("» ")
}
