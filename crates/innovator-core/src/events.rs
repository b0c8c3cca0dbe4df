//! Session event types

use innovator_api::Idea;
use serde::{Deserialize, Serialize};

use crate::ranking::RankingViolation;

/// Events emitted while a session is driven
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A clarification round trip started
    ClarifyStart { text: String },

    /// The service asked a follow-up question
    QuestionAsked { question: String },

    /// The requirement was judged clear
    Clarified { requirement: String },

    /// Idea generation started
    GenerationStart { requirement: String },

    /// Idea generation finished
    GenerationEnd {
        ideas: Vec<Idea>,
        total_generated: u32,
        total_comparisons: Option<u32>,
        ranking_violation: Option<RankingViolation>,
    },

    /// The session was returned to its initial state
    Reset,

    /// A round trip failed
    Error { message: String },
}
