use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use devtype::session::TypingSession;

use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    session: &'a TypingSession,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a TypingSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UnitStatus {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

fn unit_status(session: &TypingSession, idx: usize) -> UnitStatus {
    let position = session.position();
    if idx < position {
        if session.is_error(idx) {
            UnitStatus::Incorrect
        } else {
            UnitStatus::Correct
        }
    } else if idx == position {
        UnitStatus::Cursor
    } else {
        UnitStatus::Pending
    }
}

/// Text shown for one unit. Spaces get a visible marker when they need
/// highlighting, and lone combining signs get a dotted-circle carrier.
fn unit_display(unit: &str, status: UnitStatus) -> String {
    if unit == " " {
        return match status {
            UnitStatus::Incorrect | UnitStatus::Cursor => "\u{00b7}".to_string(),
            _ => " ".to_string(),
        };
    }
    match unit.chars().next() {
        Some(first) if is_combining(first) && status == UnitStatus::Cursor => {
            format!("\u{25cc}{unit}")
        }
        _ => unit.to_string(),
    }
}

fn is_combining(ch: char) -> bool {
    matches!(ch, '\u{0900}'..='\u{0903}' | '\u{093a}'..='\u{094f}' | '\u{0951}'..='\u{0957}' | '\u{0962}' | '\u{0963}')
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let spans: Vec<Span> = self
            .session
            .units()
            .iter()
            .enumerate()
            .map(|(idx, unit)| {
                let status = unit_status(self.session, idx);
                let style = match status {
                    UnitStatus::Correct => Style::default().fg(colors.unit_correct),
                    UnitStatus::Incorrect => Style::default()
                        .fg(colors.unit_error)
                        .bg(colors.unit_error_bg)
                        .add_modifier(Modifier::UNDERLINED),
                    UnitStatus::Cursor => Style::default()
                        .fg(colors.cursor_fg)
                        .bg(colors.cursor_bg),
                    UnitStatus::Pending => Style::default().fg(colors.muted),
                };
                Span::styled(unit_display(unit, status), style)
            })
            .collect();

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.frame))
            .style(Style::default().bg(colors.surface));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
