//! Error types for innovator-core

use thiserror::Error;

use crate::conversation::ConversationState;

/// Result type alias using innovator-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the user submits blank input
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a requirement";

/// Fallback when a failed clarification carries no usable message
pub const CLARIFY_FALLBACK: &str = "Clarification failed, please try again";

/// Fallback when a failed generation carries no usable message
pub const GENERATE_FALLBACK: &str = "Generation failed, please try again";

/// Errors that can occur while driving a session
#[derive(Error, Debug)]
pub enum Error {
    /// The idea service failed (transport or service error)
    #[error(transparent)]
    Api(#[from] innovator_api::Error),

    /// Input was rejected locally; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// A round trip of the same kind is still outstanding
    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    /// Generation already ran (or is running) for this session
    #[error("Ideas were already requested for this session")]
    AlreadyGenerated,

    /// The operation is not allowed in the current state
    #[error("Cannot {operation} while the conversation is {state}")]
    InvalidState {
        operation: &'static str,
        state: ConversationState,
    },
}

/// Text to show for a failed round trip.
///
/// Priority: the service's structured detail, then the raw transport
/// message, then `fallback`.
pub fn display_message(err: &innovator_api::Error, fallback: &str) -> String {
    if let Some(detail) = err.detail().filter(|d| !d.trim().is_empty()) {
        return detail.to_string();
    }
    let raw = err.to_string();
    if raw.trim().is_empty() {
        fallback.to_string()
    } else {
        raw
    }
}
