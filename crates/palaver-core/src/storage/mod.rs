//! Storage abstractions for Palaver.
//!
//! Defines the key-value slot trait and an in-memory implementation.
//! Durable implementations live in palaver-infra.

pub mod kv_store;
pub mod memory;
