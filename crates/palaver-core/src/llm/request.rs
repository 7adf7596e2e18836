//! Request builder: history to remote instruction sequence.
//!
//! Layout of every request:
//! ```text
//! developer  {system prompt with the remembered name}
//! user/assistant  ... one per history entry, in order ...
//! user       {the text just submitted, verbatim}
//! ```

use palaver_types::llm::RemoteInstruction;
use palaver_types::message::Message;

use crate::memory::name::DEFAULT_NAME;

/// Placeholder replaced with the remembered user name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Developer instruction used when no template is configured.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful AI assistant. The user's name is \"{name}\" if they told you. Always remember it and use it in responses. Also, remember the topics you have discussed.";

/// Builds the ordered instruction sequence sent to the remote model.
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build the instruction sequence for one completion.
    ///
    /// Always exactly one developer instruction first and exactly one user
    /// instruction holding `user_input` last, with one role-mapped
    /// instruction per history entry in between.
    pub fn build(
        history: &[Message],
        user_input: &str,
        template: Option<&str>,
        remembered_name: &str,
    ) -> Vec<RemoteInstruction> {
        let mut instructions = Vec::with_capacity(history.len() + 2);

        instructions.push(RemoteInstruction::developer(Self::developer_instruction(
            template,
            remembered_name,
        )));

        instructions.extend(history.iter().map(|m| RemoteInstruction {
            role: m.sender.role(),
            content: m.content.clone(),
        }));

        instructions.push(RemoteInstruction::user(user_input));
        instructions
    }

    /// The developer instruction text for a template and name.
    ///
    /// `{name}` is substituted wherever it appears. A custom template without
    /// the placeholder gets the name appended once the user has introduced
    /// themselves.
    pub fn developer_instruction(template: Option<&str>, remembered_name: &str) -> String {
        let template = template
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_INSTRUCTION);

        if template.contains(NAME_PLACEHOLDER) {
            return template.replace(NAME_PLACEHOLDER, remembered_name);
        }

        if remembered_name == DEFAULT_NAME || remembered_name.is_empty() {
            template.to_string()
        } else {
            format!("{template}\n\nThe user's name is \"{remembered_name}\".")
        }
    }
}

/// The most recent `max` entries of `history`, or all of it when `max` is `None`.
pub fn recent(history: &[Message], max: Option<usize>) -> &[Message] {
    match max {
        Some(max) if history.len() > max => &history[history.len() - max..],
        _ => history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_types::llm::{CompletionResponse, InstructionRole};

    #[test]
    fn test_empty_history_yields_two_instructions() {
        let out = RequestBuilder::build(&[], "hi", Some("Talk to {name}."), "Alex");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, InstructionRole::Developer);
        assert!(out[0].content.contains("Alex"));
        assert_eq!(out[1], RemoteInstruction::user("hi"));
    }

    #[test]
    fn test_history_is_role_mapped_in_order() {
        let history = vec![
            Message::user("I'm Alex"),
            Message::bot(&CompletionResponse::text("Hi Alex")),
            Message::bot_error("Sorry"),
        ];
        let out = RequestBuilder::build(&history, "how are you?", None, "Alex");

        let roles: Vec<InstructionRole> = out.iter().map(|i| i.role).collect();
        assert_eq!(
            roles,
            vec![
                InstructionRole::Developer,
                InstructionRole::User,
                InstructionRole::Assistant,
                InstructionRole::Assistant,
                InstructionRole::User,
            ]
        );
        assert_eq!(out[1].content, "I'm Alex");
        assert_eq!(out[4].content, "how are you?");
    }

    #[test]
    fn test_exactly_one_developer_instruction() {
        let history = vec![Message::user("a"), Message::user("b")];
        let out = RequestBuilder::build(&history, "c", None, DEFAULT_NAME);
        let developers = out
            .iter()
            .filter(|i| i.role == InstructionRole::Developer)
            .count();
        assert_eq!(developers, 1);
    }

    #[test]
    fn test_user_input_is_verbatim() {
        let out = RequestBuilder::build(&[], "  spaced out  ", None, DEFAULT_NAME);
        assert_eq!(out.last().unwrap().content, "  spaced out  ");
    }

    #[test]
    fn test_inputs_not_mutated() {
        let history = vec![Message::user("a")];
        let before = history.clone();
        let _ = RequestBuilder::build(&history, "b", None, "Alex");
        assert_eq!(history, before);
    }

    #[test]
    fn test_default_instruction_carries_name() {
        let text = RequestBuilder::developer_instruction(None, "Alex");
        assert!(text.starts_with("You are a helpful AI assistant."));
        assert!(text.contains("\"Alex\""));
        assert!(!text.contains(NAME_PLACEHOLDER));
    }

    #[test]
    fn test_blank_template_uses_default() {
        let text = RequestBuilder::developer_instruction(Some("   "), "Alex");
        assert!(text.starts_with("You are a helpful AI assistant."));
    }

    #[test]
    fn test_template_without_placeholder_appends_known_name() {
        let text = RequestBuilder::developer_instruction(Some("Be brief."), "Alex");
        assert!(text.starts_with("Be brief."));
        assert!(text.contains("Alex"));

        let text = RequestBuilder::developer_instruction(Some("Be brief."), DEFAULT_NAME);
        assert_eq!(text, "Be brief.");
    }

    #[test]
    fn test_recent_window() {
        let history: Vec<Message> = (0..5).map(|i| Message::user(format!("{i}"))).collect();
        assert_eq!(recent(&history, None).len(), 5);
        assert_eq!(recent(&history, Some(10)).len(), 5);
        let window = recent(&history, Some(2));
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "3");
        assert!(recent(&history, Some(0)).is_empty());
    }
}
