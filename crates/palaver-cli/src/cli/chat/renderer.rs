//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for code block
//! syntax highlighting. Bot replies are rendered as markdown once complete;
//! error-marked replies are printed plainly in red.

use crossterm::style::Color;
use palaver_types::llm::TokenUsage;
use palaver_types::message::{Message, Sender};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

/// Terminal markdown renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    /// Create a new renderer with an optional accent color.
    pub fn new(accent_color: Option<Color>) -> Self {
        let mut skin = MadSkin::default_dark();

        if let Some(color) = accent_color {
            let tc = Self::crossterm_to_termimad(color);
            skin.bold.set_fg(tc);
            skin.headers[0].set_fg(tc);
            skin.headers[1].set_fg(tc);
        }

        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply with syntax-highlighted code blocks.
    ///
    /// Code fences with a language tag are highlighted via syntect; everything
    /// else is rendered through termimad.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") && !in_code_block {
                in_code_block = true;
                code_lang = line.trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.starts_with("```") && in_code_block {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
                output.push('\n');
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&format!("{}", self.skin.term_text(line)));
            }
        }

        // Unclosed fence at the end of the reply
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    /// Print one message of the transcript with its sender label.
    pub fn print_message(&self, message: &Message) {
        let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
        match message.sender {
            Sender::User => {
                println!(
                    "  {} {} {}",
                    console::style("You").green().bold(),
                    console::style(time).dim(),
                    message.content
                );
            }
            Sender::Bot if message.is_error => {
                println!(
                    "  {} {} {}",
                    console::style("Bot").cyan().bold(),
                    console::style(time).dim(),
                    console::style(&message.content).red()
                );
            }
            Sender::Bot => {
                println!(
                    "  {} {}",
                    console::style("Bot").cyan().bold(),
                    console::style(time).dim()
                );
                println!("  {}", self.render_markdown(&message.content).trim());
            }
        }
    }

    /// Print a bot reply followed by its stats footer.
    pub fn print_reply(&self, reply: &Message, response_ms: u64) {
        println!();
        if reply.is_error {
            println!("  {}", console::style(&reply.content).red());
        } else {
            println!("  {}", self.render_markdown(&reply.content).trim());
            self.print_stats_footer(reply.usage.as_ref(), response_ms, reply.model.as_deref());
        }
        println!();
    }

    /// Print the stats footer after a bot reply.
    ///
    /// Format: "| {tokens} tokens . {reasoning} reasoning . {time}s . {model}"
    pub fn print_stats_footer(&self, usage: Option<&TokenUsage>, response_ms: u64, model: Option<&str>) {
        println!("{}", stats_footer(usage, response_ms, model));
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let theme = &self.theme_set.themes["base16-ocean.dark"];
        let mut h = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        output.push_str(&format!("  {}\n", console::style(format!("--- {lang} ---")).dim()));

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }

    fn crossterm_to_termimad(color: Color) -> termimad::crossterm::style::Color {
        match color {
            Color::Cyan => termimad::crossterm::style::Color::Cyan,
            Color::Green => termimad::crossterm::style::Color::Green,
            Color::Yellow => termimad::crossterm::style::Color::Yellow,
            Color::Magenta => termimad::crossterm::style::Color::Magenta,
            Color::Blue => termimad::crossterm::style::Color::Blue,
            Color::Red => termimad::crossterm::style::Color::Red,
            Color::Rgb { r, g, b } => termimad::crossterm::style::Color::Rgb { r, g, b },
            _ => termimad::crossterm::style::Color::Cyan,
        }
    }
}

/// The dimmed footer line shown under a successful reply.
pub fn stats_footer(usage: Option<&TokenUsage>, response_ms: u64, model: Option<&str>) -> String {
    let dot = console::style("\u{00b7}").dim();
    let mut footer = format!("  {}", console::style("|").dim());

    if let Some(usage) = usage {
        footer.push_str(&format!(" {} tokens {dot}", console::style(usage.total_tokens).dim()));
        let reasoning = usage
            .completion_tokens_details
            .as_ref()
            .map_or(0, |d| d.reasoning_tokens);
        if reasoning > 0 {
            footer.push_str(&format!(" {} reasoning {dot}", console::style(reasoning).dim()));
        }
    }

    let seconds = response_ms as f64 / 1000.0;
    footer.push_str(&format!(" {}", console::style(format!("{seconds:.1}s")).dim()));

    if let Some(model) = model {
        footer.push_str(&format!(" {dot} {}", console::style(model).dim()));
    }
    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_types::llm::CompletionTokensDetails;

    fn plain(s: String) -> String {
        console::strip_ansi_codes(&s).to_string()
    }

    #[test]
    fn test_footer_with_usage_and_model() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 32,
            total_tokens: 42,
            completion_tokens_details: Some(CompletionTokensDetails {
                reasoning_tokens: 8,
                ..Default::default()
            }),
        };
        let footer = plain(stats_footer(Some(&usage), 1500, Some("gpt-4-turbo")));
        assert!(footer.contains("42 tokens"));
        assert!(footer.contains("8 reasoning"));
        assert!(footer.contains("1.5s"));
        assert!(footer.ends_with("gpt-4-turbo"));
    }

    #[test]
    fn test_footer_without_usage() {
        let footer = plain(stats_footer(None, 250, None));
        assert!(!footer.contains("tokens"));
        assert!(footer.contains("0.2s") || footer.contains("0.3s"));
    }

    #[test]
    fn test_render_markdown_highlights_code_fence() {
        let renderer = ChatRenderer::new(None);
        let out = renderer.render_markdown("Here:\n```rust\nfn main() {}\n```\n");
        assert!(out.contains("--- rust ---"));
        assert!(plain(out).contains("fn main() {}"));
    }
}
