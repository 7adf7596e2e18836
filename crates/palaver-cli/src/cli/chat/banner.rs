//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the model, the endpoint, how many messages were restored and
/// whether the session is ephemeral, plus a hint about slash commands.
pub fn print_welcome_banner(model: &str, base_url: &str, restored: usize, ephemeral: bool) {
    println!();
    println!("  {} {}", style("*").cyan(), style("Palaver").cyan().bold());
    println!("  {}", style("Chat with an AI assistant that remembers you").dim());
    println!();
    println!("  {}     {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Endpoint:").bold(), style(base_url).dim());

    let history = match (restored, ephemeral) {
        (_, true) => "ephemeral (not saved)".to_string(),
        (0, false) => "new conversation".to_string(),
        (1, false) => "1 message restored".to_string(),
        (n, false) => format!("{n} messages restored"),
    };
    println!("  {}   {}", style("History:").bold(), style(history).dim());

    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
