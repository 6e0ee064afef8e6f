use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

/// Hints shown on every list screen.
pub const PAGING: [KeyHint; 3] = [
    KeyHint::new("n/p", "page"),
    KeyHint::new("z", "size"),
    KeyHint::new("x", "clear"),
];

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    hints
        .iter()
        .enumerate()
        .flat_map(|(i, hint)| {
            let gap = (i > 0).then(|| Span::raw("  "));
            gap.into_iter().chain([
                Span::styled(hint.key, Style::default().fg(theme.accent)),
                Span::raw(format!(" {}", hint.action)),
            ])
        })
        .collect()
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_spaced_pairs() {
        let spans = hints_to_spans(&PAGING, &Theme::default());
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "n/p page  z size  x clear");
    }
}
