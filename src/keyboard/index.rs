use std::collections::HashMap;

use crate::keyboard::key::KeyCode;
use crate::keyboard::layout::{KeyMapping, KeyboardLayout, ModifierState};
use crate::text::normalize;

/// A (key, modifier state) pair that produces some character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub key: KeyCode,
    pub state: ModifierState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPosition {
    pub row: usize,
    pub col: usize,
}

/// Lookups derived from one layout: key → position, and normalized
/// output → candidates in row-major, then slot, order.
#[derive(Clone, Debug, Default)]
pub struct LayoutIndex {
    layout_id: String,
    positions: HashMap<KeyCode, KeyPosition>,
    candidates: HashMap<String, Vec<Candidate>>,
    max_output_chars: usize,
}

impl LayoutIndex {
    pub fn build(layout: &KeyboardLayout) -> Self {
        let mut positions = HashMap::new();
        let mut candidates: HashMap<String, Vec<Candidate>> = HashMap::new();
        let mut max_output_chars = 1;

        for (row, col, mapping) in layout.mappings() {
            positions.insert(mapping.key, KeyPosition { row, col });
            for state in ModifierState::ALL {
                let output = mapping.output(state);
                if output.is_empty() {
                    continue;
                }
                let normalized = normalize(output);
                max_output_chars = max_output_chars.max(normalized.chars().count());
                candidates.entry(normalized).or_default().push(Candidate {
                    key: mapping.key,
                    state,
                });
            }
        }

        Self {
            layout_id: layout.id().to_string(),
            positions,
            candidates,
            max_output_chars,
        }
    }

    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    pub fn position(&self, key: KeyCode) -> Option<KeyPosition> {
        self.positions.get(&key).copied()
    }

    pub fn contains_key(&self, key: KeyCode) -> bool {
        self.positions.contains_key(&key)
    }

    /// Candidates for an already-normalized character.
    pub fn candidates(&self, normalized: &str) -> &[Candidate] {
        self.candidates
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether some single keystroke produces this normalized string.
    pub fn is_producible(&self, normalized: &str) -> bool {
        self.candidates.contains_key(normalized)
    }

    /// Longest normalized output of any slot, in characters.
    pub fn max_output_chars(&self) -> usize {
        self.max_output_chars
    }
}

/// A layout together with its index. This is what resolution and
/// sessions borrow; neither ever mutates it.
#[derive(Clone, Copy, Debug)]
pub struct ActiveLayout<'a> {
    pub layout: &'a KeyboardLayout,
    pub index: &'a LayoutIndex,
}

impl<'a> ActiveLayout<'a> {
    pub fn new(layout: &'a KeyboardLayout, index: &'a LayoutIndex) -> Self {
        debug_assert_eq!(layout.id(), index.layout_id());
        Self { layout, index }
    }

    pub fn id(&self) -> &'a str {
        self.layout.id()
    }

    pub fn mapping(&self, key: KeyCode) -> Option<&'a KeyMapping> {
        let pos = self.index.position(key)?;
        self.layout.rows().get(pos.row)?.get(pos.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::catalog::bundled_layout;

    #[test]
    fn test_positions_follow_rows() {
        let layout = bundled_layout("remington-gail").unwrap();
        let index = LayoutIndex::build(&layout);
        assert_eq!(index.position(KeyCode::Backquote), Some(KeyPosition { row: 0, col: 0 }));
        assert_eq!(index.position(KeyCode::KeyQ), Some(KeyPosition { row: 1, col: 1 }));
        assert_eq!(index.position(KeyCode::IntlBackslash), None);
    }

    #[test]
    fn test_candidates_are_keyed_by_normalized_output() {
        let layout = bundled_layout("remington-gail").unwrap();
        let index = LayoutIndex::build(&layout);
        let cands = index.candidates("द्य");
        assert_eq!(
            cands,
            &[Candidate {
                key: KeyCode::Backquote,
                state: ModifierState::Shift
            }]
        );
        assert!(index.candidates("zz").is_empty());
    }

    #[test]
    fn test_space_is_produced_in_every_state() {
        let layout = bundled_layout("inscript").unwrap();
        let index = LayoutIndex::build(&layout);
        let states: Vec<ModifierState> = index.candidates(" ").iter().map(|c| c.state).collect();
        assert_eq!(states, ModifierState::ALL.to_vec());
    }

    #[test]
    fn test_max_output_chars_covers_conjunct_keys() {
        let layout = bundled_layout("remington-gail").unwrap();
        let index = LayoutIndex::build(&layout);
        assert!(index.max_output_chars() >= 3);
    }

    #[test]
    fn test_active_layout_mapping_lookup() {
        let layout = bundled_layout("remington-gail").unwrap();
        let index = LayoutIndex::build(&layout);
        let active = ActiveLayout::new(&layout, &index);
        assert_eq!(active.mapping(KeyCode::KeyV).unwrap().normal, "अ");
        assert!(active.mapping(KeyCode::IntlBackslash).is_none());
    }
}
