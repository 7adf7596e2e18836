//! Main chat loop orchestration.
//!
//! Restores and prints the transcript, then reads lines until Ctrl+D or
//! `/exit`. Each non-command line goes through `SessionController::submit`
//! while a spinner runs; replies are rendered from the session events the
//! controller publishes.

use std::time::{Duration, Instant};

use console::style;
use crossterm::style::Color;
use tokio::sync::broadcast;
use tracing::{debug, info};

use palaver_core::chat::SubmitOutcome;
use palaver_types::event::SessionEvent;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let controller = &state.controller;
    let config = controller.config();
    let renderer = ChatRenderer::new(Some(Color::Cyan));

    let restored = controller.messages().await;
    print_welcome_banner(&config.model, &config.base_url, restored.len(), state.ephemeral);
    for message in &restored {
        renderer.print_message(message);
    }
    if !restored.is_empty() {
        println!();
    }

    if state.credential_source.is_none() {
        println!(
            "  {} No API key found. Set {} or {} to get replies.\n",
            style("!").yellow().bold(),
            style("PALAVER_API_KEY").bold(),
            style("OPENAI_API_KEY").bold()
        );
    }

    let mut events = controller.subscribe();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    info!(restored = restored.len(), "Chat session started");

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Line(text) => text,
        };

        if text.trim().is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Cls => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::Clear => {
                    controller.clear().await;
                    drain_events(&mut events);
                    println!("\n  {} Conversation cleared.\n", style("*").cyan().bold());
                }
                ChatCommand::History => {
                    let messages = controller.messages().await;
                    println!();
                    if messages.is_empty() {
                        println!("  {}", style("No messages yet.").dim());
                    }
                    for message in &messages {
                        renderer.print_message(message);
                    }
                    println!();
                }
                ChatCommand::Name => {
                    let name = controller.remembered_name().await;
                    println!("\n  {} I know you as {}.\n", style("*").cyan().bold(), style(name).bold());
                }
                ChatCommand::Unknown(cmd_name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(cmd_name).dim()
                    );
                }
            }
            continue;
        }

        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            indicatif::ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}")
        {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));

        let started = Instant::now();
        let outcome = controller.submit(&text).await;
        spinner.finish_and_clear();
        let response_ms = started.elapsed().as_millis() as u64;

        if outcome == SubmitOutcome::Ignored {
            debug!("Submission ignored");
            continue;
        }

        for event in drain_events(&mut events) {
            if let SessionEvent::MessageAppended { message } = event {
                if !message.is_user() {
                    renderer.print_reply(&message, response_ms);
                }
            }
        }
    }

    chat_input.flush();
    Ok(())
}

/// Collect every event published since the last drain.
fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "Session event receiver lagged");
            }
            Err(_) => break,
        }
    }
    drained
}
