//! innovator-core: client-side interaction state machine
//!
//! A [`Session`] owns the clarification dialogue ([`ConversationController`])
//! and the idea generation lifecycle ([`GenerationController`]). Operations
//! are plain state transitions that hand back [`Effect`]s; running an effect
//! against an [`innovator_api::IdeaService`] yields a [`Completion`] that is
//! fed back into the session. [`SessionDriver`] chains the two for callers
//! that simply want to await the outcome.

pub mod conversation;
pub mod driver;
pub mod error;
pub mod events;
pub mod generation;
pub mod ranking;
pub mod session;

pub use conversation::{ConversationController, ConversationState};
pub use driver::{SessionDriver, execute};
pub use error::{Error, Result, display_message};
pub use events::SessionEvent;
pub use generation::{GenerationController, GenerationOutcome, GenerationState};
pub use ranking::{RankingViolation, check_ranking};
pub use session::{Completion, Effect, Session, Ticket};
