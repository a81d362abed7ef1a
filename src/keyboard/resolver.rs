//! Pure lookups over an active layout: key → character, pressed keys →
//! modifier state, and character → every key that can produce it.

use crate::keyboard::index::{ActiveLayout, Candidate};
use crate::keyboard::key::KeyCode;
use crate::keyboard::layout::ModifierState;
use crate::text::{expand, normalize};

/// Raw output of `key` under `state`. Empty when the key is unmapped or
/// the slot is empty.
pub fn character_for<'a>(layout: &ActiveLayout<'a>, key: KeyCode, state: ModifierState) -> &'a str {
    layout.mapping(key).map(|m| m.output(state)).unwrap_or("")
}

/// Modifier state implied by the currently pressed keys. Only membership
/// in the layout's role groups matters, so the result does not depend on
/// iteration order.
pub fn modifier_state_for<I>(layout: &ActiveLayout<'_>, pressed: I) -> ModifierState
where
    I: IntoIterator<Item = KeyCode>,
{
    let groups = layout.layout.modifier_key_groups();
    let mut shift = false;
    let mut altgr = false;
    for key in pressed {
        shift |= groups.is_shift(key);
        altgr |= groups.is_altgr(key);
    }
    ModifierState::from_flags(shift, altgr)
}

pub fn is_typeable(layout: &ActiveLayout<'_>, key: KeyCode) -> bool {
    if key.is_control() || layout.layout.modifier_key_groups().contains(key) {
        return false;
    }
    layout.index.contains_key(key)
}

/// Every (key, state) whose output equals `character` after normalization,
/// in row-then-column order and Normal, Shift, AltGr, AltGr+Shift within a
/// key. Scans the layout; [`preferred_candidate`] answers from the index.
pub fn candidates_for(layout: &ActiveLayout<'_>, character: &str) -> Vec<Candidate> {
    let wanted = normalize(character);
    if wanted.is_empty() {
        return Vec::new();
    }
    let mut found = Vec::new();
    for (_, _, mapping) in layout.layout.mappings() {
        for state in ModifierState::ALL {
            let output = mapping.output(state);
            if !output.is_empty() && normalize(output) == wanted {
                found.push(Candidate {
                    key: mapping.key,
                    state,
                });
            }
        }
    }
    found
}

/// First candidate for `character`, the one on-screen guidance shows.
pub fn preferred_candidate(layout: &ActiveLayout<'_>, character: &str) -> Option<Candidate> {
    layout.index.candidates(&normalize(character)).first().copied()
}

/// Key that starts typing `character`, with the normalized text it emits.
///
/// When no single key produces `character`, falls back to the longest
/// producible prefix of its keystroke spelling (ा for ो on a layout
/// without an o-matra key).
pub fn first_keystroke(layout: &ActiveLayout<'_>, character: &str) -> Option<(Candidate, String)> {
    let wanted = normalize(character);
    if let Some(candidate) = preferred_candidate(layout, &wanted) {
        return Some((candidate, wanted));
    }
    let spelled: Vec<char> = expand(&wanted).chars().collect();
    (1..spelled.len()).rev().find_map(|len| {
        let prefix = normalize(&spelled[..len].iter().collect::<String>());
        preferred_candidate(layout, &prefix).map(|c| (c, prefix))
    })
}
