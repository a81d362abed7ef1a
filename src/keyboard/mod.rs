pub mod catalog;
pub mod finger;
pub mod index;
pub mod key;
pub mod layout;
pub mod registry;
pub mod resolver;

pub use index::{ActiveLayout, Candidate, LayoutIndex};
pub use key::KeyCode;
pub use layout::{KeyMapping, KeyboardLayout, LayoutError, ModifierState};
pub use registry::LayoutRegistry;
