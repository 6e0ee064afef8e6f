use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use api_types::client::id_type_label;

use super::{field, heading, money, notice_lines};
use crate::{
    controllers::{ClientDetailsController, client_details::Stage},
    ui::{components::modal, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, details: &ClientDetailsController, theme: &Theme) {
    let rect = modal::centered_rect(60, 70, area);
    let block = modal::open(frame, rect, "Client details", theme);

    let mut lines = Vec::new();
    match details.client() {
        Some(client) => {
            lines.push(field("Code", client.client_code.clone(), theme));
            lines.push(field("Name", client.full_name(), theme));
            lines.push(field(
                "Identification",
                format!("{} {}", id_type_label(&client.id_type), client.id_number),
                theme,
            ));
            lines.push(field("Email", client.email.clone().unwrap_or_default(), theme));
            lines.push(field(
                "Phone",
                client.phone_number.clone().unwrap_or_default(),
                theme,
            ));
            if let Some(birth) = &client.birth_date {
                lines.push(field("Birth date", birth.display_date(), theme));
            }
            if let Some(joined) = &client.join_date {
                lines.push(field("Joined", joined.display_date(), theme));
            }
            if let Some(process_id) = &client.process_id {
                lines.push(field("Process", process_id.clone(), theme));
            }
        }
        None if details.is_loading() => lines.push(Line::from("Loading client…")),
        None => {}
    }

    if let Some(account) = details.account() {
        lines.push(Line::default());
        lines.push(heading("Account", theme));
        lines.push(field("Number", account.account_number.clone(), theme));
        lines.push(field("Payroll value", money(account.payroll_value), theme));
        lines.push(field("Balance", money(account.balance), theme));
        lines.push(field(
            "Status",
            account.status.clone().unwrap_or_else(|| "-".to_string()),
            theme,
        ));
    } else if details.stage() == Stage::Account {
        lines.push(Line::default());
        lines.push(Line::from("Loading account…"));
    }

    if let Some(payment) = details.first_payment() {
        lines.push(Line::default());
        lines.push(heading("First payment", theme));
        lines.push(field(
            "Date",
            payment
                .payment_date
                .as_ref()
                .map(|ts| ts.display_date())
                .unwrap_or_else(|| "-".to_string()),
            theme,
        ));
        lines.push(field("Amount", money(payment.amount), theme));
        lines.push(field(
            "Status",
            payment.status.clone().unwrap_or_else(|| "-".to_string()),
            theme,
        ));
    } else if details.stage() == Stage::FirstPayment {
        lines.push(Line::default());
        lines.push(Line::from("Loading first payment…"));
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

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}
