use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use devtype::keyboard::KeyCode;
use devtype::session::{CompletionReason, SessionSummary};

use crate::ui::components::stats_sidebar::accuracy_color;
use crate::ui::theme::Theme;

/// End-of-session results.
pub struct Dashboard<'a> {
    pub summary: &'a SessionSummary,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(summary: &'a SessionSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

/// Physical key with the highest mean delay, from per-key timings.
pub fn slowest_key(summary: &SessionSummary) -> Option<(KeyCode, f64)> {
    let mut totals: Vec<(KeyCode, f64, usize)> = Vec::new();
    for t in &summary.per_key_times {
        match totals.iter_mut().find(|(k, _, _)| *k == t.key) {
            Some(entry) => {
                entry.1 += t.time_ms;
                entry.2 += 1;
            }
            None => totals.push((t.key, t.time_ms, 1)),
        }
    }
    totals
        .into_iter()
        .map(|(k, sum, n)| (k, sum / n as f64))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.summary;

        let title = match s.reason {
            CompletionReason::TargetConsumed => " Passage Complete ",
            CompletionReason::TimeLimit => " Time Up ",
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent))
            .style(Style::default().bg(colors.surface));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            format!("Results on {}", s.layout_id),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Speed:    ", Style::default().fg(colors.ink)),
            Span::styled(
                format!("{:.0} WPM", s.wpm),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({:.0} CPM)", s.cpm),
                Style::default().fg(colors.muted),
            ),
        ]))
        .render(layout[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.ink)),
            Span::styled(
                format!("{:.1}%", s.accuracy),
                Style::default()
                    .fg(accuracy_color(colors, s.accuracy))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}/{} correct)", s.correct, s.typed),
                Style::default().fg(colors.muted),
            ),
        ]))
        .render(layout[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.ink)),
            Span::styled(
                format!("{:.1}s", s.elapsed_secs),
                Style::default().fg(colors.ink),
            ),
            Span::styled(
                format!("  ({:.0}% of passage)", s.completion_percent()),
                Style::default().fg(colors.muted),
            ),
        ]))
        .render(layout[3], buf);

        let slowest = slowest_key(s)
            .map(|(key, ms)| format!("{key} ({ms:.0} ms)"))
            .unwrap_or_else(|| "-".to_string());
        Paragraph::new(Line::from(vec![
            Span::styled("  Slowest:  ", Style::default().fg(colors.ink)),
            Span::styled(slowest, Style::default().fg(colors.fair)),
        ]))
        .render(layout[4], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Enter] Next passage  [r] Retry  [Esc] Quit",
            Style::default().fg(colors.accent),
        )))
        .render(layout[6], buf);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use devtype::session::result::KeyTime;

    use super::*;

    #[test]
    fn test_slowest_key_uses_mean_delay() {
        let t = |key, time_ms| KeyTime {
            key,
            time_ms,
            correct: true,
        };
        let summary = SessionSummary {
            wpm: 10.0,
            cpm: 50.0,
            accuracy: 100.0,
            correct: 4,
            incorrect: 0,
            typed: 4,
            total_units: 4,
            elapsed_secs: 2.0,
            timestamp: Utc::now(),
            layout_id: "inscript".to_string(),
            reason: CompletionReason::TargetConsumed,
            per_key_times: vec![
                t(KeyCode::KeyK, 100.0),
                t(KeyCode::KeyE, 400.0),
                t(KeyCode::KeyK, 600.0),
            ],
        };
        let (key, ms) = slowest_key(&summary).unwrap();
        assert_eq!(key, KeyCode::KeyE);
        assert!((ms - 400.0).abs() < 1e-9);
    }
}
