//! Interactive terminal chat for Palaver.
//!
//! Implements the chat loop: restored transcript, welcome banner, async
//! readline input, a thinking spinner while a submission is in flight,
//! markdown rendering of replies, and slash commands. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
