use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Physical key identifiers, named after the W3C UI Events `code` values.
///
/// The set is closed: a layout file naming anything else fails to parse,
/// so unknown identifiers are rejected when the catalog loads rather than
/// while a user is typing.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum KeyCode {
    Backquote,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Digit0,
    Minus,
    Equal,
    Backspace,
    Tab,
    KeyQ,
    KeyW,
    KeyE,
    KeyR,
    KeyT,
    KeyY,
    KeyU,
    KeyI,
    KeyO,
    KeyP,
    BracketLeft,
    BracketRight,
    Backslash,
    CapsLock,
    KeyA,
    KeyS,
    KeyD,
    KeyF,
    KeyG,
    KeyH,
    KeyJ,
    KeyK,
    KeyL,
    Semicolon,
    Quote,
    Enter,
    ShiftLeft,
    IntlBackslash,
    KeyZ,
    KeyX,
    KeyC,
    KeyV,
    KeyB,
    KeyN,
    KeyM,
    Comma,
    Period,
    Slash,
    ShiftRight,
    ControlLeft,
    MetaLeft,
    AltLeft,
    Space,
    AltRight,
    MetaRight,
    ContextMenu,
    ControlRight,
    Escape,
}

/// Keys that edit or navigate rather than type. Never typeable, whatever
/// the layout says about them.
pub const CONTROL_KEYS: &[KeyCode] = &[
    KeyCode::Backspace,
    KeyCode::Enter,
    KeyCode::Tab,
    KeyCode::Escape,
];

impl KeyCode {
    pub fn is_control(self) -> bool {
        CONTROL_KEYS.contains(&self)
    }

    /// Parse a host-supplied identifier. Anything unrecognised is `None`
    /// and treated by callers as unmapped input.
    pub fn parse(id: &str) -> Option<Self> {
        id.parse().ok()
    }
}
