//! Remote-model abstractions for Palaver.
//!
//! - `CompletionProvider`: RPITIT trait for concrete endpoint implementations
//! - `CompletionClient`: the boundary that normalizes every outcome into a `CompletionResult`
//! - `RequestBuilder`: derives the instruction sequence from history

pub mod client;
pub mod provider;
pub mod request;
