//! Devanagari touch-typing engine: keyboard layouts, keystroke resolution,
//! Unicode-aware validation and session statistics.

pub mod config;
pub mod engine;
pub mod keyboard;
pub mod session;
pub mod store;
pub mod text;
