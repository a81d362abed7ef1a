use ratatui::layout::{Constraint, Layout, Rect};

/// Narrowest area the keyboard diagram draws in, borders included.
pub const KEYBOARD_MIN_WIDTH: u16 = 62;
pub const SIDEBAR_WIDTH: u16 = 30;
const TEXT_MIN_HEIGHT: u16 = 5;

/// How much of the practice screen fits in the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Density {
    /// Text, keyboard and the stats sidebar.
    Full,
    /// Text and keyboard; stats move into the header.
    Compact,
    /// Text only.
    Minimal,
}

impl Density {
    pub fn for_area(area: Rect, keyboard_rows: usize) -> Self {
        let keyboard_height = keyboard_rows as u16 + 2;
        let fits_keyboard =
            area.width >= KEYBOARD_MIN_WIDTH && area.height >= keyboard_height + TEXT_MIN_HEIGHT + 2;
        match (fits_keyboard, area.width >= KEYBOARD_MIN_WIDTH + SIDEBAR_WIDTH) {
            (true, true) => Density::Full,
            (true, false) => Density::Compact,
            (false, _) => Density::Minimal,
        }
    }

    pub fn shows_sidebar(self) -> bool {
        self == Density::Full
    }
}

/// Regions of the practice screen: a one-line header and footer around
/// the text, the keyboard under it, and the sidebar on the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PracticeRegions {
    pub header: Rect,
    pub text: Rect,
    pub keyboard: Option<Rect>,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub density: Density,
}

impl PracticeRegions {
    pub fn split(area: Rect, keyboard_rows: usize) -> Self {
        let density = Density::for_area(area, keyboard_rows);
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(TEXT_MIN_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        let (left, sidebar) = if density.shows_sidebar() {
            let [left, right] =
                Layout::horizontal([Constraint::Min(KEYBOARD_MIN_WIDTH), Constraint::Length(SIDEBAR_WIDTH)])
                    .areas(body);
            (left, Some(right))
        } else {
            (body, None)
        };

        let (text, keyboard) = if density == Density::Minimal {
            (left, None)
        } else {
            let [text, keyboard] = Layout::vertical([
                Constraint::Min(TEXT_MIN_HEIGHT),
                Constraint::Length(keyboard_rows as u16 + 2),
            ])
            .areas(left);
            (text, Some(keyboard))
        };

        Self {
            header,
            text,
            keyboard,
            sidebar,
            footer,
            density,
        }
    }
}

/// Fixed-size results panel in the middle of `area`, shrunk to fit.
pub fn result_panel(area: Rect) -> Rect {
    let width = area.width.min(56);
    let height = area.height.min(12);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
