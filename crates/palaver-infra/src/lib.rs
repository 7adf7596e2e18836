//! Infrastructure layer for Palaver.
//!
//! Contains implementations of the ports defined in `palaver-core`: the
//! SQLite key-value store and the OpenAI-compatible completion provider,
//! plus configuration loading, credential lookup and data directory
//! resolution.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod sqlite;
