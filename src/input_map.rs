use std::collections::HashSet;

use crossterm::event::{KeyCode as TermKey, KeyEvent, KeyModifiers};
use devtype::keyboard::KeyCode;

/// A terminal key event restated as the physical key that produced it on
/// a US-QWERTY board, plus the modifiers held with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalPress {
    pub key: KeyCode,
    pub pressed: HashSet<String>,
}

/// Base and shifted character for each printable physical key.
const QWERTY: &[(KeyCode, char, char)] = &[
    (KeyCode::Backquote, '`', '~'),
    (KeyCode::Digit1, '1', '!'),
    (KeyCode::Digit2, '2', '@'),
    (KeyCode::Digit3, '3', '#'),
    (KeyCode::Digit4, '4', '$'),
    (KeyCode::Digit5, '5', '%'),
    (KeyCode::Digit6, '6', '^'),
    (KeyCode::Digit7, '7', '&'),
    (KeyCode::Digit8, '8', '*'),
    (KeyCode::Digit9, '9', '('),
    (KeyCode::Digit0, '0', ')'),
    (KeyCode::Minus, '-', '_'),
    (KeyCode::Equal, '=', '+'),
    (KeyCode::KeyQ, 'q', 'Q'),
    (KeyCode::KeyW, 'w', 'W'),
    (KeyCode::KeyE, 'e', 'E'),
    (KeyCode::KeyR, 'r', 'R'),
    (KeyCode::KeyT, 't', 'T'),
    (KeyCode::KeyY, 'y', 'Y'),
    (KeyCode::KeyU, 'u', 'U'),
    (KeyCode::KeyI, 'i', 'I'),
    (KeyCode::KeyO, 'o', 'O'),
    (KeyCode::KeyP, 'p', 'P'),
    (KeyCode::BracketLeft, '[', '{'),
    (KeyCode::BracketRight, ']', '}'),
    (KeyCode::Backslash, '\\', '|'),
    (KeyCode::KeyA, 'a', 'A'),
    (KeyCode::KeyS, 's', 'S'),
    (KeyCode::KeyD, 'd', 'D'),
    (KeyCode::KeyF, 'f', 'F'),
    (KeyCode::KeyG, 'g', 'G'),
    (KeyCode::KeyH, 'h', 'H'),
    (KeyCode::KeyJ, 'j', 'J'),
    (KeyCode::KeyK, 'k', 'K'),
    (KeyCode::KeyL, 'l', 'L'),
    (KeyCode::Semicolon, ';', ':'),
    (KeyCode::Quote, '\'', '"'),
    (KeyCode::KeyZ, 'z', 'Z'),
    (KeyCode::KeyX, 'x', 'X'),
    (KeyCode::KeyC, 'c', 'C'),
    (KeyCode::KeyV, 'v', 'V'),
    (KeyCode::KeyB, 'b', 'B'),
    (KeyCode::KeyN, 'n', 'N'),
    (KeyCode::KeyM, 'm', 'M'),
    (KeyCode::Comma, ',', '<'),
    (KeyCode::Period, '.', '>'),
    (KeyCode::Slash, '/', '?'),
    (KeyCode::Space, ' ', ' '),
];

/// Physical key and whether the character needed Shift.
pub fn physical_key_for(ch: char) -> Option<(KeyCode, bool)> {
    QWERTY.iter().find_map(|&(key, base, shifted)| {
        if ch == base {
            Some((key, false))
        } else if ch == shifted {
            Some((key, true))
        } else {
            None
        }
    })
}

/// Translate a terminal key event. Alt stands in for AltGr, since most
/// terminals swallow the right-Alt distinction.
pub fn map_key_event(event: &KeyEvent) -> Option<PhysicalPress> {
    let (key, char_shift) = match event.code {
        TermKey::Char(ch) => physical_key_for(ch)?,
        TermKey::Backspace => (KeyCode::Backspace, false),
        TermKey::Enter => (KeyCode::Enter, false),
        TermKey::Tab => (KeyCode::Tab, false),
        TermKey::BackTab => (KeyCode::Tab, true),
        TermKey::Esc => (KeyCode::Escape, false),
        _ => return None,
    };

    let mut pressed = HashSet::new();
    if char_shift || event.modifiers.contains(KeyModifiers::SHIFT) {
        pressed.insert(KeyCode::ShiftLeft.to_string());
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        pressed.insert(KeyCode::AltRight.to_string());
    }
    pressed.insert(key.to_string());
    Some(PhysicalPress { key, pressed })
}
