use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState},
};

use crate::{
    controllers::{InfoPane, ProcessInfoController},
    ui::{
        components::{modal, pager},
        screens::{clients::client_table, errors::error_table},
        theme::Theme,
    },
};

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    info: &ProcessInfoController,
    filtering: bool,
    theme: &Theme,
) {
    let rect = modal::centered_rect(90, 90, area);
    let block = modal::open(frame, rect, &format!("Process {}", info.process_id()), theme);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(summary(info, theme)), layout[0]);
    frame.render_widget(Paragraph::new(filter_line(info, filtering, theme)), layout[1]);

    let focus = info.focus();
    let errors = info.errors();
    render_pane(
        frame,
        layout[2],
        PaneView {
            title: " Validation errors ",
            focused: focus == InfoPane::Errors,
            selected: errors.selected_index(),
            rows: errors.visible_len(),
            status: pager::status_line(errors, theme),
        },
        error_table(&errors.visible(), theme),
        theme,
    );

    let clients = info.clients();
    render_pane(
        frame,
        layout[3],
        PaneView {
            title: " Imported clients ",
            focused: focus == InfoPane::Clients,
            selected: clients.selected_index(),
            rows: clients.visible_len(),
            status: pager::status_line(clients, theme),
        },
        client_table(&clients.visible(), theme),
        theme,
    );
}

struct PaneView {
    title: &'static str,
    focused: bool,
    selected: usize,
    rows: usize,
    status: Line<'static>,
}

fn render_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    view: PaneView,
    table: ratatui::widgets::Table<'_>,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let border = if view.focused { theme.accent } else { theme.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(view.title);

    let mut state = TableState::default();
    if view.focused && view.rows > 0 {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(table.block(block), layout[0], &mut state);
    frame.render_widget(Paragraph::new(view.status), layout[1]);
}

fn summary(info: &ProcessInfoController, theme: &Theme) -> Vec<Line<'static>> {
    if let Some(error) = info.details_error() {
        return vec![Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.error),
        ))];
    }
    let Some(details) = info.details() else {
        let text = if info.details_loading() { "Loading…" } else { "-" };
        return vec![Line::from(text)];
    };
    let dim = Style::default().fg(theme.dim);
    vec![
        Line::from(vec![
            Span::styled("File ", dim),
            Span::raw(details.file_name.clone().unwrap_or_else(|| "-".to_string())),
            Span::styled("  Status ", dim),
            Span::styled(
                details.status.as_str(),
                Style::default()
                    .fg(theme.status(details.status))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Records ", dim),
            Span::raw(details.total_records.to_string()),
            Span::styled("  Ok ", dim),
            Span::raw(details.successful_count.to_string()),
            Span::styled("  Errors ", dim),
            Span::raw(details.error_count.to_string()),
            Span::styled("  Success ", dim),
            Span::raw(format!("{}%", details.success_percentage())),
        ]),
        Line::from(vec![
            Span::styled("Processed ", dim),
            Span::raw(
                details
                    .processing_date
                    .as_ref()
                    .map(|ts| ts.display())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
    ]
}

fn filter_line(info: &ProcessInfoController, filtering: bool, theme: &Theme) -> Line<'static> {
    let label = info.filter_field().label();
    let cursor = if filtering { "_" } else { "" };
    let style = if filtering {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };
    Line::from(vec![
        Span::styled(format!("{label} filter"), style),
        Span::raw(format!(": {}{cursor}", info.filter_input())),
    ])
}
