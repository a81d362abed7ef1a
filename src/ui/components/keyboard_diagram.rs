use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use devtype::keyboard::finger::{Finger, FingerAssignment, Hand};
use devtype::keyboard::{KeyCode, KeyMapping, KeyboardLayout, ModifierState};

use crate::ui::theme::Theme;

/// The active layout drawn row by row, showing what each key types under
/// the current modifier state.
pub struct KeyboardDiagram<'a> {
    pub layout: &'a KeyboardLayout,
    pub state: ModifierState,
    pub next_key: Option<KeyCode>,
    pub pressed_key: Option<KeyCode>,
    pub theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(
        layout: &'a KeyboardLayout,
        state: ModifierState,
        next_key: Option<KeyCode>,
        pressed_key: Option<KeyCode>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            layout,
            state,
            next_key,
            pressed_key,
            theme,
        }
    }
}

const KEY_WIDTH: u16 = 4;
const ROW_OFFSETS: &[u16] = &[0, 2, 3, 4, 6];

fn finger_color(assignment: FingerAssignment) -> Color {
    match (assignment.hand, assignment.finger) {
        (Hand::Left, Finger::Pinky) | (Hand::Right, Finger::Pinky) => Color::Rgb(120, 70, 70),
        (Hand::Left, Finger::Ring) | (Hand::Right, Finger::Ring) => Color::Rgb(120, 95, 60),
        (Hand::Left, Finger::Middle) | (Hand::Right, Finger::Middle) => Color::Rgb(80, 110, 60),
        (Hand::Left, Finger::Index) => Color::Rgb(60, 95, 120),
        (Hand::Right, Finger::Index) => Color::Rgb(70, 95, 140),
        _ => Color::Rgb(80, 80, 80),
    }
}

/// Cap text for one key. Dependent signs get a dotted-circle carrier so
/// they stay visible on their own.
fn key_cap(mapping: &KeyMapping, state: ModifierState) -> String {
    let output = mapping.output(state);
    if output.is_empty() {
        return String::new();
    }
    if output == " " {
        return "\u{2423}".to_string();
    }
    match output.chars().next() {
        Some(ch) if ('\u{0900}'..='\u{0903}').contains(&ch) || ('\u{093a}'..='\u{094f}').contains(&ch) => {
            format!("\u{25cc}{output}")
        }
        _ => output.to_string(),
    }
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} [{}] ", self.layout.name(), self.state.label()))
            .border_style(Style::default().fg(colors.frame))
            .style(Style::default().bg(colors.surface));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 4 || inner.width < 40 {
            return;
        }

        let groups = self.layout.modifier_key_groups();
        let held = |key: KeyCode| match self.state {
            ModifierState::Normal => false,
            ModifierState::Shift => groups.is_shift(key),
            ModifierState::AltGr => groups.is_altgr(key),
            ModifierState::AltGrShift => groups.contains(key),
        };

        for (row_idx, row) in self.layout.rows().iter().enumerate() {
            let y = inner.y + row_idx as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let offset = ROW_OFFSETS.get(row_idx).copied().unwrap_or(0);

            for (col_idx, mapping) in row.iter().enumerate() {
                let x = inner.x + offset + col_idx as u16 * KEY_WIDTH;
                if x + KEY_WIDTH > inner.x + inner.width {
                    break;
                }

                let style = if self.pressed_key == Some(mapping.key) {
                    Style::default()
                        .fg(colors.surface)
                        .bg(colors.pressed_key)
                        .add_modifier(Modifier::BOLD)
                } else if self.next_key == Some(mapping.key) {
                    Style::default()
                        .fg(colors.surface)
                        .bg(colors.guide_key)
                        .add_modifier(Modifier::BOLD)
                } else if held(mapping.key) {
                    Style::default().fg(colors.surface).bg(colors.modifier_held)
                } else {
                    Style::default()
                        .fg(colors.ink)
                        .bg(finger_color(mapping.assignment()))
                };

                buf.set_string(x, y, " ".repeat(KEY_WIDTH as usize - 1), style);
                buf.set_string(x + 1, y, key_cap(mapping, self.state), style);
            }
        }
    }
}
