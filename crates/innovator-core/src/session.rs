//! Session lifecycle: handoff between the controllers, reset, and the
//! stale-response guard.

use innovator_api::{
    ClarifyRequest, ClarifyResponse, GenerateRequest, GenerateResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    conversation::{ConversationController, ConversationState},
    error::Result,
    generation::GenerationController,
};

/// Session generation a request was dispatched under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    epoch: u64,
}

impl Ticket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// A request the session wants performed
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Clarify {
        ticket: Ticket,
        request: ClarifyRequest,
    },
    Generate {
        ticket: Ticket,
        request: GenerateRequest,
    },
}

impl Effect {
    pub fn ticket(&self) -> Ticket {
        match self {
            Effect::Clarify { ticket, .. } | Effect::Generate { ticket, .. } => *ticket,
        }
    }
}

/// The result of an [`Effect`], tagged with the ticket it was issued under
#[derive(Debug)]
pub enum Completion {
    Clarify {
        ticket: Ticket,
        result: innovator_api::Result<ClarifyResponse>,
    },
    Generate {
        ticket: Ticket,
        result: innovator_api::Result<GenerateResponse>,
    },
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::Clarify { ticket, .. } | Completion::Generate { ticket, .. } => *ticket,
        }
    }
}

/// One clarification-then-generation session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bumped by every reset; older tickets are stale
    epoch: u64,
    conversation: ConversationController,
    generation: GenerationController,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn conversation(&self) -> &ConversationController {
        &self.conversation
    }

    pub fn generation(&self) -> &GenerationController {
        &self.generation
    }

    /// True while either round trip is outstanding
    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading() || self.generation.is_loading()
    }

    /// Whether the input should accept a submission right now
    pub fn accepts_input(&self) -> bool {
        !self.conversation.is_loading()
            && self.conversation.state() != ConversationState::Clarified
    }

    /// Reset is offered once the dialogue has started
    pub fn can_reset(&self) -> bool {
        self.conversation.has_started()
    }

    /// Observationally identical to a newly constructed session
    pub fn is_fresh(&self) -> bool {
        self.conversation == ConversationController::default()
            && self.generation == GenerationController::default()
    }

    /// Submit user input to the dialogue
    pub fn submit(&mut self, text: &str) -> Result<Effect> {
        let request = self.conversation.submit(text)?;
        Ok(self.clarify_effect(request))
    }

    pub fn submit_initial(&mut self, text: &str) -> Result<Effect> {
        let request = self.conversation.submit_initial(text)?;
        Ok(self.clarify_effect(request))
    }

    pub fn submit_reply(&mut self, text: &str) -> Result<Effect> {
        let request = self.conversation.submit_reply(text)?;
        Ok(self.clarify_effect(request))
    }

    /// Feed a completed request back in.
    ///
    /// Results from before the latest reset are dropped. Reaching clarity
    /// returns the generation effect; nothing else produces a follow-up.
    pub fn apply(&mut self, completion: Completion) -> Option<Effect> {
        let ticket = completion.ticket();
        if ticket.epoch != self.epoch {
            tracing::debug!(
                "Discarding stale response from session generation {} (current {})",
                ticket.epoch,
                self.epoch
            );
            return None;
        }

        match completion {
            Completion::Clarify { result, .. } => {
                let requirement = self.conversation.complete(result)?;
                self.start_generation(&requirement)
            }
            Completion::Generate { result, .. } => {
                self.generation.complete(result);
                None
            }
        }
    }

    /// Return both controllers to their initial state and invalidate
    /// every outstanding request. Makes no network calls.
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.conversation = ConversationController::default();
        self.generation = GenerationController::default();
        tracing::debug!("Session reset (generation {})", self.epoch);
    }

    /// Pretty JSON dump of the whole session
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn ticket(&self) -> Ticket {
        Ticket { epoch: self.epoch }
    }

    fn clarify_effect(&self, request: ClarifyRequest) -> Effect {
        Effect::Clarify {
            ticket: self.ticket(),
            request,
        }
    }

    fn start_generation(&mut self, requirement: &str) -> Option<Effect> {
        match self.generation.generate(requirement) {
            Ok(request) => Some(Effect::Generate {
                ticket: self.ticket(),
                request,
            }),
            Err(e) => {
                tracing::warn!("Not starting generation: {}", e);
                None
            }
        }
    }
}
