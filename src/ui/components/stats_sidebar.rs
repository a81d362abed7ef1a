use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use devtype::engine::{Guidance, SessionSnapshot};

use crate::ui::theme::{Theme, ThemeColors};

/// History and goal figures for the current layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Benchmarks {
    pub target_wpm: u32,
    pub best_wpm: Option<f64>,
    pub recent_wpm: Option<f64>,
}

/// Live figures for the running session plus the next-key hint.
pub struct StatsSidebar<'a> {
    snapshot: &'a SessionSnapshot,
    guidance: Option<&'a Guidance>,
    benchmarks: Benchmarks,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        snapshot: &'a SessionSnapshot,
        guidance: Option<&'a Guidance>,
        benchmarks: Benchmarks,
        theme: &'a Theme,
    ) -> Self {
        Self {
            snapshot,
            guidance,
            benchmarks,
            theme,
        }
    }
}

pub fn accuracy_color(colors: &ThemeColors, accuracy: f64) -> Color {
    if accuracy >= 95.0 {
        colors.good
    } else if accuracy >= 85.0 {
        colors.fair
    } else {
        colors.poor
    }
}

/// Good once the target is met; a target of 0 disables the comparison.
pub fn wpm_color(colors: &ThemeColors, wpm: f64, target_wpm: u32) -> Color {
    if target_wpm > 0 && wpm >= target_wpm as f64 {
        colors.good
    } else {
        colors.accent
    }
}

/// `m:ss`, or `None` for untimed sessions.
pub fn format_remaining(snapshot: &SessionSnapshot) -> Option<String> {
    snapshot.remaining.map(|d| {
        let secs = d.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    })
}

fn labelled<'s>(label: &'s str, value: String, colors: &ThemeColors, value_color: Color) -> Line<'s> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(colors.ink)),
        Span::styled(value, Style::default().fg(value_color)),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = &self.snapshot.stats;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(6)])
            .split(area);

        let progress = if self.snapshot.total == 0 {
            0.0
        } else {
            self.snapshot.position as f64 / self.snapshot.total as f64 * 100.0
        };

        let mut lines = vec![
            labelled(
                "WPM: ",
                format!("{:.0}", stats.wpm),
                colors,
                wpm_color(colors, stats.wpm, self.benchmarks.target_wpm),
            ),
            labelled("CPM: ", format!("{:.0}", stats.cpm), colors, colors.muted),
            Line::from(""),
            labelled(
                "Accuracy: ",
                format!("{:.1}%", stats.accuracy),
                colors,
                accuracy_color(colors, stats.accuracy),
            ),
            labelled("Errors:   ", format!("{}", stats.errors), colors, colors.poor),
            Line::from(""),
            labelled(
                "Progress: ",
                format!("{}/{} ({progress:.0}%)", self.snapshot.position, self.snapshot.total),
                colors,
                colors.accent,
            ),
        ];
        if let Some(remaining) = format_remaining(self.snapshot) {
            lines.push(labelled("Time left: ", remaining, colors, colors.fair));
        }
        lines.push(Line::from(""));
        if self.benchmarks.target_wpm > 0 {
            let target = format!("{} WPM", self.benchmarks.target_wpm);
            lines.push(labelled("Target: ", target, colors, colors.muted));
        }
        if let Some(recent) = self.benchmarks.recent_wpm {
            lines.push(labelled("Recent: ", format!("{recent:.0} WPM"), colors, colors.muted));
        }
        if let Some(best) = self.benchmarks.best_wpm {
            lines.push(labelled("Best: ", format!("{best:.0} WPM"), colors, colors.muted));
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Stats ")
                    .border_style(Style::default().fg(colors.frame))
                    .style(Style::default().bg(colors.surface)),
            )
            .render(sections[0], buf);

        let hint = match self.guidance {
            Some(g) => vec![
                Line::from(Span::styled(
                    if g.keystroke == g.character {
                        format!("{}  →  {}", g.character, g.label)
                    } else {
                        format!("{} ({})  →  {}", g.character, g.keystroke, g.label)
                    },
                    Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} {}", g.candidate.state.label(), g.finger),
                    Style::default().fg(colors.muted),
                )),
            ],
            None => vec![Line::from(Span::styled(
                "No key types this",
                Style::default().fg(colors.muted),
            ))],
        };
        Paragraph::new(hint)
            .block(
                Block::bordered()
                    .title(" Next key ")
                    .border_style(Style::default().fg(colors.frame))
                    .style(Style::default().bg(colors.surface)),
            )
            .render(sections[1], buf);
    }
}
