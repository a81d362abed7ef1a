pub mod input;
pub mod result;
pub mod timer;
pub mod typing;

pub use input::{IgnoreReason, KeystrokeOutcome, KeystrokeRecord};
pub use result::SessionSummary;
pub use typing::{CompletionReason, SessionState, TypingSession};
