//! Slash commands for interactive mode

use innovator_api::Role;
use innovator_core::Session;

/// Result of executing a slash command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Discard the session and start over
    Reset,
    /// Show a message to the user
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, session: &Session) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let command = rest
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "reset" | "r" | "new" => {
            if session.can_reset() {
                CommandResult::Reset
            } else {
                CommandResult::Message("Nothing to reset yet.".to_string())
            }
        }

        "history" => CommandResult::Message(history_text(session)),

        "state" => CommandResult::Message(
            session
                .snapshot_json()
                .unwrap_or_else(|e| format!("Failed to serialize session: {}", e)),
        ),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

/// The dialogue so far, one turn per line
pub fn history_text(session: &Session) -> String {
    let conversation = session.conversation();
    if !conversation.has_started() {
        return "No conversation yet.".to_string();
    }

    let mut out = String::new();
    for turn in conversation.turns() {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        out.push_str(&format!("[{}] {}\n", who, turn.content));
    }
    if let Some(turn) = conversation.speculative_turn() {
        out.push_str(&format!("[you, sending] {}\n", turn.content));
    }
    if let Some(requirement) = conversation.confirmed_requirement() {
        out.push_str(&format!("Confirmed requirement: {}\n", requirement));
    }
    out.push_str(&format!(
        "Conversation: {} | Generation: {}",
        conversation.state(),
        session.generation().state().as_str()
    ));
    out
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /reset, /r, /new     Discard this session and start over
  /history             Show the clarification dialogue so far
  /state               Dump the session state as JSON
  /quit, /exit, /q     Exit innovator

Type a research requirement to begin. If the service asks a follow-up
question, type your answer; ideas are generated once the requirement is
clear."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use innovator_api::ClarifyResponse;
    use innovator_core::{Completion, Effect};

    fn asked_session() -> Session {
        let mut session = Session::new();
        let ticket = match session.submit("RL").unwrap() {
            Effect::Clarify { ticket, .. } => ticket,
            other => panic!("unexpected effect {:?}", other),
        };
        session.apply(Completion::Clarify {
            ticket,
            result: Ok(ClarifyResponse::unclear("Which algorithm?", vec![])),
        });
        session
    }

    #[test]
    fn test_not_a_command() {
        assert!(execute_command("GRPO improvements", &Session::new()).is_none());
    }

    #[test]
    fn test_reset_needs_started_session() {
        assert!(matches!(
            execute_command("/reset", &Session::new()),
            Some(CommandResult::Message(_))
        ));
        assert_eq!(
            execute_command("/reset", &asked_session()),
            Some(CommandResult::Reset)
        );
    }

    #[test]
    fn test_history_lists_turns() {
        let Some(CommandResult::Message(text)) = execute_command("/history", &asked_session())
        else {
            panic!("expected history message");
        };
        assert!(text.contains("[you] RL"));
        assert!(text.contains("[assistant] Which algorithm?"));
        assert!(text.contains("awaiting clarification"));
    }

    #[test]
    fn test_state_is_json() {
        let Some(CommandResult::Message(text)) = execute_command("/state", &asked_session())
        else {
            panic!("expected state message");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["conversation"]["state"], "awaiting_clarification");
    }

    #[test]
    fn test_quit_and_unknown() {
        let session = Session::new();
        assert_eq!(execute_command("/q", &session), Some(CommandResult::Exit));
        assert_eq!(
            execute_command("/Frobnicate now", &session),
            Some(CommandResult::Unknown("frobnicate".into()))
        );
    }
}
