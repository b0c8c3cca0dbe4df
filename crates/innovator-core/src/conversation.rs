//! Clarification dialogue: turns, pending question, confirmed requirement.

use innovator_api::{ClarifyRequest, ClarifyResponse, ConversationTurn, Role};
use serde::{Deserialize, Serialize};

use crate::error::{CLARIFY_FALLBACK, EMPTY_INPUT_MESSAGE, Error, Result, display_message};

/// Question shown when the service asks for clarification without one
const DEFAULT_QUESTION: &str = "Could you describe the requirement in more detail?";

/// Where the clarification dialogue stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// The service asked a question and is waiting for a reply
    AwaitingClarification,
    /// The requirement is confirmed; terminal for this session
    Clarified,
    /// The last round trip failed; resubmitting retries it
    Error,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingClarification => "awaiting clarification",
            Self::Clarified => "clarified",
            Self::Error => "in error",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which operation produced the outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Submission {
    Initial,
    Reply,
}

/// User turn shown while its round trip is in flight.
///
/// Never merged into the log: the response replaces the log wholesale
/// and this is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SpeculativeTurn {
    submission: Submission,
    turn: ConversationTurn,
}

/// Drives the clarification dialogue to a confirmed requirement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationController {
    state: ConversationState,
    /// Server-confirmed dialogue, in chronological order
    turns: Vec<ConversationTurn>,
    speculative: Option<SpeculativeTurn>,
    /// Text of the first submission of the dialogue
    original_requirement: Option<String>,
    confirmed_requirement: Option<String>,
    pending_question: Option<String>,
    last_error: Option<String>,
    validation_error: Option<String>,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Confirmed dialogue turns
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The user turn awaiting its response, if any
    pub fn speculative_turn(&self) -> Option<&ConversationTurn> {
        self.speculative.as_ref().map(|s| &s.turn)
    }

    /// True while a clarification round trip is outstanding
    pub fn is_loading(&self) -> bool {
        self.speculative.is_some()
    }

    pub fn confirmed_requirement(&self) -> Option<&str> {
        self.confirmed_requirement.as_deref()
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Whether anything has happened since the session started
    pub fn has_started(&self) -> bool {
        self.state != ConversationState::Idle || !self.turns.is_empty() || self.is_loading()
    }

    /// Whether the next submission is the first of the dialogue
    pub fn expects_initial(&self) -> bool {
        match self.state {
            ConversationState::Idle => true,
            ConversationState::Error => self.turns.is_empty(),
            _ => false,
        }
    }

    /// Submit user input, routed to [`Self::submit_initial`] or [`Self::submit_reply`]
    pub fn submit(&mut self, text: &str) -> Result<ClarifyRequest> {
        if self.expects_initial() {
            self.submit_initial(text)
        } else {
            self.submit_reply(text)
        }
    }

    /// Start the dialogue with a requirement
    pub fn submit_initial(&mut self, text: &str) -> Result<ClarifyRequest> {
        self.ensure_idle_for("submit a new requirement")?;
        if !self.expects_initial() {
            return Err(Error::InvalidState {
                operation: "submit a new requirement",
                state: self.state,
            });
        }
        let text = self.validate(text)?;

        self.original_requirement = Some(text.clone());
        self.begin(Submission::Initial, &text);
        Ok(ClarifyRequest {
            requirement: text,
            conversation_history: Vec::new(),
        })
    }

    /// Answer the pending question (or retry after a failure)
    pub fn submit_reply(&mut self, text: &str) -> Result<ClarifyRequest> {
        self.ensure_idle_for("reply")?;
        if !matches!(
            self.state,
            ConversationState::AwaitingClarification | ConversationState::Error
        ) {
            return Err(Error::InvalidState {
                operation: "reply",
                state: self.state,
            });
        }
        let text = self.validate(text)?;

        self.begin(Submission::Reply, &text);
        Ok(ClarifyRequest {
            requirement: text,
            conversation_history: self.turns.clone(),
        })
    }

    /// Apply the outcome of the outstanding round trip.
    ///
    /// Returns the confirmed requirement when the service reports the
    /// requirement as clear.
    pub fn complete(&mut self, result: innovator_api::Result<ClarifyResponse>) -> Option<String> {
        let Some(speculative) = self.speculative.take() else {
            tracing::warn!("Clarification result arrived with no request outstanding, ignoring");
            return None;
        };
        let before = self.state;

        let confirmed = match result {
            Ok(response) if response.is_clear => {
                let confirmed = self.confirmed_text(&speculative);
                self.reconcile(&speculative, response.conversation_history, None);
                self.state = ConversationState::Clarified;
                self.pending_question = None;
                self.last_error = None;
                self.confirmed_requirement = Some(confirmed.clone());
                Some(confirmed)
            }
            Ok(response) => {
                let question = response
                    .question
                    .filter(|q| !q.trim().is_empty())
                    .or_else(|| last_assistant(&response.conversation_history))
                    .unwrap_or_else(|| DEFAULT_QUESTION.to_string());
                self.reconcile(&speculative, response.conversation_history, Some(&question));
                self.state = ConversationState::AwaitingClarification;
                self.pending_question = Some(question);
                self.last_error = None;
                None
            }
            Err(e) => {
                self.state = ConversationState::Error;
                self.last_error = Some(display_message(&e, CLARIFY_FALLBACK));
                None
            }
        };

        tracing::debug!(
            "conversation: {} -> {} ({} turns)",
            before,
            self.state,
            self.turns.len()
        );
        confirmed
    }

    fn ensure_idle_for(&self, operation: &'static str) -> Result<()> {
        if self.is_loading() {
            return Err(Error::Busy("clarification"));
        }
        if self.state == ConversationState::Clarified {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn validate(&mut self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.validation_error = Some(EMPTY_INPUT_MESSAGE.to_string());
            return Err(Error::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }
        self.validation_error = None;
        Ok(trimmed.to_string())
    }

    fn begin(&mut self, submission: Submission, text: &str) {
        self.speculative = Some(SpeculativeTurn {
            submission,
            turn: ConversationTurn::user(text),
        });
    }

    /// The submitted text on an initial clear, the original requirement
    /// once replies have been exchanged
    fn confirmed_text(&self, speculative: &SpeculativeTurn) -> String {
        match speculative.submission {
            Submission::Initial => speculative.turn.content.clone(),
            Submission::Reply => self
                .original_requirement
                .clone()
                .unwrap_or_else(|| speculative.turn.content.clone()),
        }
    }

    /// Replace the log with the server's history; when the server sent
    /// none, extend the local log with this round trip's turns instead.
    fn reconcile(
        &mut self,
        speculative: &SpeculativeTurn,
        server_history: Vec<ConversationTurn>,
        question: Option<&str>,
    ) {
        if !server_history.is_empty() {
            self.turns = server_history;
            return;
        }
        self.turns.push(speculative.turn.clone());
        if let Some(q) = question {
            self.turns.push(ConversationTurn::assistant(q));
        }
    }
}

fn last_assistant(history: &[ConversationTurn]) -> Option<String> {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::Assistant)
        .map(|t| t.content.clone())
}
