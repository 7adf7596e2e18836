//! Conversation session logic and port definitions for Palaver.
//!
//! This crate owns the message store, history persistence, name extraction,
//! request building, completion normalization and the session controller.
//! It defines the "ports" (`KvStore`, `CompletionProvider`) that the
//! infrastructure layer implements. It depends only on `palaver-types` --
//! never on `palaver-infra` or any database/HTTP crate.

pub mod chat;
pub mod event;
pub mod history;
pub mod llm;
pub mod memory;
pub mod storage;
