//! Idea generation lifecycle for a confirmed requirement

use innovator_api::{GenerateRequest, GenerateResponse, Idea, Scheme};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, GENERATE_FALLBACK, Result, display_message},
    ranking::{self, RankingViolation},
};

/// A successful generation result, in service order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub requirement: String,
    /// Ranked ideas; rank is position
    pub ideas: Vec<Idea>,
    pub total_generated: u32,
    /// Only meaningful for the pairwise scheme
    pub total_comparisons: Option<u32>,
    /// Set when the service order breaks the ranking contract
    pub ranking_violation: Option<RankingViolation>,
}

impl GenerationOutcome {
    fn from_response(requirement: String, response: GenerateResponse) -> Self {
        let ranking_violation = ranking::check_ranking(&response.top_ideas).err();
        if let Some(ref v) = ranking_violation {
            tracing::warn!("Generation result breaks ranking order: {}", v);
        }
        let total_generated = if (response.total_generated as usize) < response.top_ideas.len() {
            tracing::warn!(
                "total_generated ({}) is below the number of returned ideas ({})",
                response.total_generated,
                response.top_ideas.len()
            );
            response.top_ideas.len() as u32
        } else {
            response.total_generated
        };

        Self {
            requirement,
            ideas: response.top_ideas,
            total_generated,
            total_comparisons: response.total_comparisons,
            ranking_violation,
        }
    }

    /// Scheme the ideas were scored under
    pub fn scheme(&self) -> Option<Scheme> {
        ranking::scheme_of(&self.ideas)
    }
}

/// Where idea generation stands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationState {
    #[default]
    NotStarted,
    InFlight {
        requirement: String,
    },
    Succeeded {
        outcome: GenerationOutcome,
    },
    Failed {
        requirement: String,
        last_error: String,
    },
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InFlight { .. } => "in flight",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Runs the single generation request of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationController {
    state: GenerationState,
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// True while the generation request is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self.state, GenerationState::InFlight { .. })
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        match &self.state {
            GenerationState::Succeeded { outcome } => Some(outcome),
            _ => None,
        }
    }

    /// Ranked ideas, empty unless generation succeeded
    pub fn ideas(&self) -> &[Idea] {
        self.outcome().map(|o| o.ideas.as_slice()).unwrap_or(&[])
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            GenerationState::Failed { last_error, .. } => Some(last_error),
            _ => None,
        }
    }

    /// Start generation; allowed once per session
    pub fn generate(&mut self, requirement: &str) -> Result<GenerateRequest> {
        match self.state {
            GenerationState::NotStarted => {}
            GenerationState::InFlight { .. } => return Err(Error::Busy("generation")),
            _ => return Err(Error::AlreadyGenerated),
        }

        tracing::debug!("generation: not started -> in flight");
        self.state = GenerationState::InFlight {
            requirement: requirement.to_string(),
        };
        Ok(GenerateRequest {
            requirement: requirement.to_string(),
        })
    }

    /// Apply the outcome of the generation request
    pub fn complete(&mut self, result: innovator_api::Result<GenerateResponse>) {
        let requirement = match &self.state {
            GenerationState::InFlight { requirement } => requirement.clone(),
            _ => {
                tracing::warn!("Generation result arrived with no request outstanding, ignoring");
                return;
            }
        };

        self.state = match result {
            Ok(response) => GenerationState::Succeeded {
                outcome: GenerationOutcome::from_response(requirement, response),
            },
            Err(e) => GenerationState::Failed {
                requirement,
                last_error: display_message(&e, GENERATE_FALLBACK),
            },
        };
        tracing::debug!("generation: in flight -> {}", self.state.as_str());
    }
}
