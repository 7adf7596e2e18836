//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and are handled locally; they are never sent to
//! the model.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Erase the conversation history and the remembered name.
    Clear,
    /// Clear the terminal screen.
    Cls,
    /// Exit the chat session.
    Exit,
    /// Reprint the conversation.
    History,
    /// Show the name the assistant will use.
    Name,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/reset" => Some(ChatCommand::Clear),
        "/cls" => Some(ChatCommand::Cls),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/name" | "/whoami" => Some(ChatCommand::Name),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/clear").cyan(), "Erase the conversation and remembered name");
    println!("  {}      {}", style("/cls").cyan(), "Clear the screen");
    println!("  {}  {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}     {}", style("/name").cyan(), "Show the name I remember for you");
    println!("  {}     {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit, Ctrl+C safe (no message loss)").dim()
    );
    println!();
}
