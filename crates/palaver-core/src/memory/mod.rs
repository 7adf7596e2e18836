//! Facts remembered about the user across sessions.

pub mod name;
