//! Shared domain types for Palaver.
//!
//! This crate contains the core domain types used across the Palaver client:
//! conversation messages, remote-model instructions and results, configuration,
//! session events, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod message;
