use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use api_types::client::{ClientDetail, id_type_label};

use crate::{
    controllers::{ClientFilter, ListController},
    ui::{components::pager, theme::Theme},
};

/// Client table shared by the per-process and the global client screens.
pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    list: &ListController<ClientDetail, ClientFilter>,
    title: &str,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let mut title = title.to_string();
    let filter = list.filter();
    if !filter.name.is_empty() {
        title.push_str(&format!("[name: {}] ", filter.name));
    }
    if !filter.code.is_empty() {
        title.push_str(&format!("[code: {}] ", filter.code));
    }

    let table = client_table(&list.visible(), theme).block(
        Block::default().borders(Borders::ALL).title(title),
    );
    let mut table_state = TableState::default();
    if list.visible_len() > 0 {
        table_state.select(Some(list.selected_index()));
    }
    frame.render_stateful_widget(table, layout[0], &mut table_state);
    frame.render_widget(Paragraph::new(pager::status_line(list, theme)), layout[1]);
}

/// Table of clients, also used by the process-info dialog.
pub fn client_table<'a>(clients: &[&ClientDetail], theme: &Theme) -> Table<'a> {
    let rows: Vec<Row<'a>> = clients
        .iter()
        .map(|client| {
            let account = client
                .account
                .as_ref()
                .map(|account| account.account_number.clone())
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(client.client_code.clone()),
                Cell::from(format!(
                    "{} {}",
                    id_type_label(&client.id_type),
                    client.id_number
                )),
                Cell::from(client.full_name()),
                Cell::from(client.email.clone().unwrap_or_default()),
                Cell::from(account),
            ])
        })
        .collect();

    let header = Row::new(vec!["Code", "Id", "Name", "Email", "Account"])
        .style(Style::default().fg(theme.dim));
    let widths = [
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(16),
    ];

    Table::new(rows, widths)
        .header(header)
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ")
}
