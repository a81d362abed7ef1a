use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keyboard::finger::{Finger, FingerAssignment, Hand};
use crate::keyboard::key::KeyCode;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("failed to parse layout: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no bundled layout named '{0}'")]
    NotBundled(String),

    #[error("layout has an empty id")]
    MissingId,

    #[error("layout '{layout}' has no keys")]
    Empty { layout: String },

    #[error("layout '{layout}' maps {key} more than once")]
    DuplicateKey { layout: String, key: KeyCode },

    #[error("layout '{layout}' declares modifier key {key} that appears in no row")]
    UnknownModifierKey { layout: String, key: KeyCode },

    #[error("layout '{layout}' lists {key} as both a shift and an altgr key")]
    ConflictingModifierRole { layout: String, key: KeyCode },
}

/// One of the four Shift/AltGr combinations a keystroke can be made under.
/// Always derived from the pressed-key set, never tracked separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierState {
    #[default]
    Normal,
    Shift,
    AltGr,
    AltGrShift,
}

impl ModifierState {
    /// Slot order within a key, used to order candidates.
    pub const ALL: [ModifierState; 4] = [
        ModifierState::Normal,
        ModifierState::Shift,
        ModifierState::AltGr,
        ModifierState::AltGrShift,
    ];

    pub fn from_flags(shift: bool, altgr: bool) -> Self {
        match (shift, altgr) {
            (true, true) => ModifierState::AltGrShift,
            (false, true) => ModifierState::AltGr,
            (true, false) => ModifierState::Shift,
            (false, false) => ModifierState::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModifierState::Normal => "Normal",
            ModifierState::Shift => "Shift",
            ModifierState::AltGr => "AltGr",
            ModifierState::AltGrShift => "AltGr+Shift",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub key: KeyCode,
    #[serde(default)]
    pub normal: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub altgr: String,
    #[serde(default)]
    pub altgr_shift: String,
    pub finger: Finger,
    pub hand: Hand,
    #[serde(default)]
    pub label: String,
}

impl KeyMapping {
    /// The slot selected by `state`. Empty when the key produces nothing
    /// under that combination.
    pub fn output(&self, state: ModifierState) -> &str {
        match state {
            ModifierState::Normal => &self.normal,
            ModifierState::Shift => &self.shift,
            ModifierState::AltGr => &self.altgr,
            ModifierState::AltGrShift => &self.altgr_shift,
        }
    }

    pub fn assignment(&self) -> FingerAssignment {
        FingerAssignment::new(self.hand, self.finger)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierKeyGroups {
    #[serde(default)]
    pub shift: Vec<KeyCode>,
    #[serde(default)]
    pub altgr: Vec<KeyCode>,
}

impl ModifierKeyGroups {
    pub fn is_shift(&self, key: KeyCode) -> bool {
        self.shift.contains(&key)
    }

    pub fn is_altgr(&self, key: KeyCode) -> bool {
        self.altgr.contains(&key)
    }

    pub fn contains(&self, key: KeyCode) -> bool {
        self.is_shift(key) || self.is_altgr(key)
    }
}

/// On-disk shape of a layout. Rows are tables so the TOML stays readable.
#[derive(Deserialize)]
struct LayoutDocument {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    modifier_key_groups: ModifierKeyGroups,
    #[serde(default)]
    rows: Vec<RowDocument>,
}

#[derive(Deserialize)]
struct RowDocument {
    #[serde(default)]
    keys: Vec<KeyMapping>,
}

/// A validated, immutable keyboard layout.
///
/// Rows keep the visual grouping (number row through space row) but only
/// the flattened key → mapping relation matters for resolution.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    id: String,
    name: String,
    description: String,
    modifier_key_groups: ModifierKeyGroups,
    rows: Vec<Vec<KeyMapping>>,
}

impl KeyboardLayout {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        modifier_key_groups: ModifierKeyGroups,
        rows: Vec<Vec<KeyMapping>>,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            modifier_key_groups,
            rows,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_toml(source: &str) -> Result<Self, LayoutError> {
        let doc: LayoutDocument = toml::from_str(source)?;
        Self::new(
            doc.id,
            doc.name,
            doc.description,
            doc.modifier_key_groups,
            doc.rows.into_iter().map(|r| r.keys).collect(),
        )
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.id.trim().is_empty() {
            return Err(LayoutError::MissingId);
        }

        let mut seen = HashSet::new();
        for (_, _, mapping) in self.mappings() {
            if !seen.insert(mapping.key) {
                return Err(LayoutError::DuplicateKey {
                    layout: self.id.clone(),
                    key: mapping.key,
                });
            }
        }
        if seen.is_empty() {
            return Err(LayoutError::Empty {
                layout: self.id.clone(),
            });
        }

        let groups = &self.modifier_key_groups;
        for &key in groups.shift.iter().chain(groups.altgr.iter()) {
            if !seen.contains(&key) {
                return Err(LayoutError::UnknownModifierKey {
                    layout: self.id.clone(),
                    key,
                });
            }
            if groups.is_shift(key) && groups.is_altgr(key) {
                return Err(LayoutError::ConflictingModifierRole {
                    layout: self.id.clone(),
                    key,
                });
            }
        }

        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn modifier_key_groups(&self) -> &ModifierKeyGroups {
        &self.modifier_key_groups
    }

    pub fn rows(&self) -> &[Vec<KeyMapping>] {
        &self.rows
    }

    /// Every mapping with its (row, column), in declared row order.
    pub fn mappings(&self) -> impl Iterator<Item = (usize, usize, &KeyMapping)> {
        self.rows.iter().enumerate().flat_map(|(row_idx, row)| {
            row.iter()
                .enumerate()
                .map(move |(col_idx, mapping)| (row_idx, col_idx, mapping))
        })
    }
}
