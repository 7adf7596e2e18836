//! Session orchestration: the controller that drives submit and clear.

pub mod controller;

pub use controller::{FALLBACK_REPLY, SessionController, SubmitOutcome};
