//! `palaver clear`: erase the conversation and the remembered name.

use console::style;
use dialoguer::Confirm;

use crate::state::AppState;

pub async fn clear_history(state: &AppState, force: bool, quiet: bool) -> anyhow::Result<()> {
    let count = state.controller.messages().await.len();

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Erase {count} message(s) and the remembered name? This cannot be undone"
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  {}", style("Nothing cleared.").dim());
            return Ok(());
        }
    }

    state.controller.clear().await;

    if !quiet {
        println!(
            "  {} Cleared {} message(s).",
            style("*").cyan().bold(),
            style(count).bold()
        );
    }
    Ok(())
}
