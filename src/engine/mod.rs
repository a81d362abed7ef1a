pub mod practice;
pub mod stats;

pub use practice::{Guidance, PracticeEngine, SessionSnapshot};
pub use stats::TypingStats;
