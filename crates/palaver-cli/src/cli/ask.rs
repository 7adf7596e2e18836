//! `palaver ask`: one-shot submission.
//!
//! The message and its reply are appended to the saved conversation just
//! like a chat turn.

use palaver_core::chat::SubmitOutcome;

use crate::state::AppState;

use super::chat::renderer::ChatRenderer;

pub async fn ask(state: &AppState, text: &str, json: bool) -> anyhow::Result<()> {
    let started = std::time::Instant::now();
    let (user, reply) = match state.controller.submit(text).await {
        SubmitOutcome::Replied { user, reply } => (user, reply),
        SubmitOutcome::Ignored => anyhow::bail!("nothing to send: the message is empty"),
    };

    if json {
        let out = serde_json::json!({ "user": user, "reply": reply });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if reply.is_error {
        eprintln!("{}", console::style(&reply.content).red());
    } else {
        let renderer = ChatRenderer::new(None);
        let response_ms = started.elapsed().as_millis() as u64;
        println!("{}", renderer.render_markdown(&reply.content).trim_end());
        renderer.print_stats_footer(reply.usage.as_ref(), response_ms, reply.model.as_deref());
    }

    if reply.is_error {
        anyhow::bail!("the completion request failed (run with -v for details)");
    }
    Ok(())
}
