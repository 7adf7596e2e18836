//! `palaver history`: print the saved conversation.

use console::style;
use palaver_types::message::Message;

use crate::state::AppState;

use super::chat::renderer::ChatRenderer;

/// Total tokens reported across all bot replies.
pub fn total_tokens(messages: &[Message]) -> u64 {
    messages
        .iter()
        .filter_map(|m| m.usage.as_ref())
        .map(|u| u64::from(u.total_tokens))
        .sum()
}

pub async fn show_history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let messages = state.controller.messages().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No messages yet. Start with: palaver chat").dim());
        println!();
        return Ok(());
    }

    let renderer = ChatRenderer::new(None);
    println!();
    for message in &messages {
        renderer.print_message(message);
    }

    let errors = messages.iter().filter(|m| m.is_error).count();
    println!();
    println!(
        "  {} {} messages {} {} tokens{}",
        style("|").dim(),
        style(messages.len()).dim(),
        style("\u{00b7}").dim(),
        style(total_tokens(&messages)).dim(),
        if errors > 0 {
            format!(" {} {}", style("\u{00b7}").dim(), style(format!("{errors} failed")).red())
        } else {
            String::new()
        }
    );
    println!();
    Ok(())
}
