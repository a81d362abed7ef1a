use tracing::{debug, info};

use crate::keyboard::index::{ActiveLayout, LayoutIndex};
use crate::keyboard::layout::KeyboardLayout;

/// The known layouts and the current selection.
///
/// The index is derived from the selected layout and rebuilt only when
/// the selection changes, so `active()` always hands out a consistent
/// layout/index pair.
#[derive(Debug)]
pub struct LayoutRegistry {
    layouts: Vec<KeyboardLayout>,
    selected: usize,
    index: LayoutIndex,
}

impl LayoutRegistry {
    /// Build a registry selecting `initial`, then `default_id`, then the
    /// first layout. Returns `None` only for an empty catalog.
    pub fn new(layouts: Vec<KeyboardLayout>, initial: &str, default_id: &str) -> Option<Self> {
        if layouts.is_empty() {
            return None;
        }
        let selected = Self::position_in(&layouts, initial)
            .or_else(|| {
                debug!("layout '{initial}' unknown, falling back to '{default_id}'");
                Self::position_in(&layouts, default_id)
            })
            .unwrap_or(0);
        let index = LayoutIndex::build(&layouts[selected]);
        Some(Self {
            layouts,
            selected,
            index,
        })
    }

    fn position_in(layouts: &[KeyboardLayout], id: &str) -> Option<usize> {
        layouts.iter().position(|l| l.id() == id)
    }

    /// Switch to `id`. Unknown ids leave the current selection untouched.
    pub fn select_layout(&mut self, id: &str) -> bool {
        let Some(pos) = Self::position_in(&self.layouts, id) else {
            debug!("ignoring selection of unknown layout '{id}'");
            return false;
        };
        if pos != self.selected {
            self.selected = pos;
            self.index = LayoutIndex::build(&self.layouts[pos]);
            info!("selected layout '{id}'");
        }
        true
    }

    pub fn current_layout(&self) -> &KeyboardLayout {
        &self.layouts[self.selected]
    }

    pub fn current_index(&self) -> &LayoutIndex {
        &self.index
    }

    pub fn active(&self) -> ActiveLayout<'_> {
        ActiveLayout::new(self.current_layout(), &self.index)
    }

    pub fn contains(&self, id: &str) -> bool {
        Self::position_in(&self.layouts, id).is_some()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.id()).collect()
    }

    pub fn layouts(&self) -> &[KeyboardLayout] {
        &self.layouts
    }

    /// Cycle to the next layout in catalog order, wrapping around.
    pub fn select_next(&mut self) -> &str {
        let next = (self.selected + 1) % self.layouts.len();
        let id = self.layouts[next].id().to_string();
        self.select_layout(&id);
        self.current_layout().id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::catalog::{DEFAULT_LAYOUT_ID, bundled_layouts};
    use crate::keyboard::key::KeyCode;
    use crate::keyboard::layout::ModifierState;
    use crate::keyboard::resolver::character_for;

    fn registry(initial: &str) -> LayoutRegistry {
        LayoutRegistry::new(bundled_layouts().unwrap(), initial, DEFAULT_LAYOUT_ID).unwrap()
    }

    #[test]
    fn test_initial_selection() {
        assert_eq!(registry("inscript").current_layout().id(), "inscript");
    }

    #[test]
    fn test_unknown_initial_falls_back_to_default() {
        let reg = registry("no-such-layout");
        assert_eq!(reg.current_layout().id(), DEFAULT_LAYOUT_ID);
        assert_eq!(reg.current_index().layout_id(), DEFAULT_LAYOUT_ID);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(LayoutRegistry::new(Vec::new(), "x", "y").is_none());
    }

    #[test]
    fn test_select_unknown_keeps_prior_selection() {
        let mut reg = registry("inscript");
        assert!(!reg.select_layout("nope"));
        assert_eq!(reg.current_layout().id(), "inscript");
        assert_eq!(reg.current_index().layout_id(), "inscript");
    }

    #[test]
    fn test_index_follows_selection() {
        let mut reg = registry("remington-gail");
        assert_eq!(
            character_for(&reg.active(), KeyCode::KeyE, ModifierState::Normal),
            "म"
        );
        assert!(reg.select_layout("inscript"));
        assert_eq!(reg.current_index().layout_id(), "inscript");
        assert_eq!(
            character_for(&reg.active(), KeyCode::KeyE, ModifierState::Normal),
            "ा"
        );
    }

    #[test]
    fn test_select_next_wraps() {
        let mut reg = registry("remington-gail");
        let count = reg.ids().len();
        let start = reg.current_layout().id().to_string();
        for _ in 0..count {
            reg.select_next();
        }
        assert_eq!(reg.current_layout().id(), start);
    }
}
