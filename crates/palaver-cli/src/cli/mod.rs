//! CLI command definitions for the `palaver` binary.
//!
//! Uses clap derive macros for argument parsing. Running `palaver` with no
//! subcommand starts the interactive chat.

pub mod ask;
pub mod chat;
pub mod clear;
pub mod config;
pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with an OpenAI-compatible model from your terminal.
#[derive(Parser)]
#[command(name = "palaver", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Keep history in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    ///
    /// Ignored for the interactive chat, whose transcript owns stdout.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Tracing filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,palaver_core=debug,palaver_infra=debug,palaver_cli=debug",
            _ => "trace",
        }
    }

    /// Whether span export is on for this run.
    ///
    /// The exporter prints to stdout, so it stays off for the interactive
    /// chat to keep spans out of the transcript.
    pub fn otel_enabled(&self) -> bool {
        self.otel && !matches!(self.command, None | Some(Commands::Chat))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (the default).
    Chat,

    /// Print the saved conversation.
    History,

    /// Erase the conversation history and the remembered name.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },

    /// Send a single message and print the reply.
    Ask {
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["palaver"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["palaver", "ask", "I'm", "Alex"]).unwrap();
        match cli.command {
            Some(Commands::Ask { text }) => assert_eq!(text.join(" "), "I'm Alex"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_requires_text() {
        assert!(Cli::try_parse_from(["palaver", "ask"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["palaver", "history", "--json", "--ephemeral", "-vv"]).unwrap();
        assert!(cli.json);
        assert!(cli.ephemeral);
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn test_otel_stays_off_for_interactive_chat() {
        let cli = Cli::try_parse_from(["palaver", "--otel"]).unwrap();
        assert!(!cli.otel_enabled());
        let cli = Cli::try_parse_from(["palaver", "chat", "--otel"]).unwrap();
        assert!(!cli.otel_enabled());

        let cli = Cli::try_parse_from(["palaver", "ask", "--otel", "hi"]).unwrap();
        assert!(cli.otel_enabled());
        let cli = Cli::try_parse_from(["palaver", "history"]).unwrap();
        assert!(!cli.otel_enabled());
    }

    #[test]
    fn test_quiet_filter() {
        let cli = Cli::try_parse_from(["palaver", "--quiet", "clear", "--force"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
        assert!(matches!(cli.command, Some(Commands::Clear { force: true })));
    }
}
