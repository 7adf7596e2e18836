//! Conversation history: the in-memory message log and its persisted snapshot.

pub mod persistence;
pub mod store;
