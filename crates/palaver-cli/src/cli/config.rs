//! `palaver config`: show the effective configuration.
//!
//! The credential itself is never printed, only where it came from.

use console::style;
use serde::Serialize;

use palaver_core::llm::request::RequestBuilder;
use palaver_core::memory::name::DEFAULT_NAME;
use palaver_infra::config::config_path;
use palaver_infra::sqlite::pool::DATABASE_FILE;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ConfigReport {
    data_dir: String,
    config_file: String,
    database: Option<String>,
    model: String,
    base_url: String,
    request_timeout_secs: u64,
    max_history: Option<usize>,
    system_prompt: String,
    custom_system_prompt: bool,
    credential: String,
}

fn report(state: &AppState) -> ConfigReport {
    let config = state.config();
    ConfigReport {
        data_dir: state.data_dir.display().to_string(),
        config_file: config_path(&state.data_dir).display().to_string(),
        database: (!state.ephemeral)
            .then(|| state.data_dir.join(DATABASE_FILE).display().to_string()),
        model: config.model.clone(),
        base_url: config.base_url.clone(),
        request_timeout_secs: config.request_timeout_secs,
        max_history: config.max_history,
        system_prompt: RequestBuilder::developer_instruction(
            config.system_prompt_template.as_deref(),
            DEFAULT_NAME,
        ),
        custom_system_prompt: config.system_prompt_template.is_some(),
        credential: match &state.credential_source {
            Some(var) => format!("set (from {var})"),
            None => "missing".to_string(),
        },
    }
}

pub fn show_config(state: &AppState, json: bool) -> anyhow::Result<()> {
    let report = report(state);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let row = |label: &str, value: &str| {
        println!("  {:<14} {}", style(label).bold(), value);
    };

    println!();
    row("Data dir", &report.data_dir);
    row("Config file", &report.config_file);
    row(
        "Database",
        report.database.as_deref().unwrap_or("(ephemeral, in memory)"),
    );
    row("Model", &report.model);
    row("Endpoint", &report.base_url);
    row("Timeout", &format!("{}s", report.request_timeout_secs));
    row(
        "History sent",
        &report
            .max_history
            .map_or("all messages".to_string(), |n| format!("last {n} messages")),
    );
    let credential = if state.credential_source.is_some() {
        style(report.credential.as_str()).green().to_string()
    } else {
        style(report.credential.as_str()).red().to_string()
    };
    row("API key", &credential);
    println!();
    println!(
        "  {}{}",
        style("System prompt").bold(),
        if report.custom_system_prompt { "" } else { " (default)" }
    );
    println!("  {}", style(&report.system_prompt).dim());
    println!();
    Ok(())
}
