//! Request and response shapes for the clarify and generate operations

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the clarification dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /clarify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyRequest {
    pub requirement: String,
    pub conversation_history: Vec<ConversationTurn>,
}

/// Response of `POST /clarify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyResponse {
    pub is_clear: bool,
    /// Follow-up question, present when `is_clear` is false
    #[serde(default)]
    pub question: Option<String>,
    /// Authoritative history; replaces the caller's copy
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}

impl ClarifyResponse {
    /// A "requirement is clear" response
    pub fn clear(conversation_history: Vec<ConversationTurn>) -> Self {
        Self {
            is_clear: true,
            question: None,
            conversation_history,
        }
    }

    /// A "please clarify" response
    pub fn unclear(
        question: impl Into<String>,
        conversation_history: Vec<ConversationTurn>,
    ) -> Self {
        Self {
            is_clear: false,
            question: Some(question.into()),
            conversation_history,
        }
    }
}

/// Body of `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub requirement: String,
}

/// Response of `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub top_ideas: Vec<Idea>,
    pub total_generated: u32,
    /// Only reported by pairwise-comparison deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_comparisons: Option<u32>,
}

/// Which scoring shape a deployment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// `score` plus innovation/feasibility sub-scores
    Absolute,
    /// `win_rate` from pairwise comparisons
    Pairwise,
}

/// Scheme-dependent score fields of an idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scoring {
    /// Pairwise win-rate scheme
    Compared {
        win_rate: f64,
        #[serde(default)]
        wins: u32,
        #[serde(default)]
        total_comparisons: u32,
    },
    /// Absolute scoring scheme
    Scored {
        score: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        innovation_score: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feasibility_score: Option<f64>,
    },
}

/// A generated idea, as ranked by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIdea")]
pub struct Idea {
    #[serde(rename = "idea")]
    pub title: String,
    #[serde(flatten)]
    pub scoring: Scoring,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Wire shape of an idea; the title arrives as `idea`, `title`, or both
#[derive(Deserialize)]
struct RawIdea {
    #[serde(default)]
    idea: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(flatten)]
    scoring: Scoring,
    #[serde(default)]
    comment: Option<String>,
}

impl TryFrom<RawIdea> for Idea {
    type Error = String;

    fn try_from(raw: RawIdea) -> std::result::Result<Self, Self::Error> {
        let title = match (raw.idea, raw.title) {
            (Some(idea), _) if !idea.trim().is_empty() => idea,
            (_, Some(title)) if !title.trim().is_empty() => title,
            (Some(blank), _) | (None, Some(blank)) => blank,
            (None, None) => return Err("idea is missing its `idea` or `title` field".into()),
        };
        Ok(Self {
            title,
            scoring: raw.scoring,
            comment: raw.comment,
        })
    }
}

impl Idea {
    /// Create an idea under the absolute scoring scheme
    pub fn scored(title: impl Into<String>, score: f64) -> Self {
        Self {
            title: title.into(),
            scoring: Scoring::Scored {
                score,
                innovation_score: None,
                feasibility_score: None,
            },
            comment: None,
        }
    }

    /// Create an idea under the pairwise scheme
    pub fn compared(title: impl Into<String>, wins: u32, total_comparisons: u32) -> Self {
        let win_rate = if total_comparisons == 0 {
            0.0
        } else {
            wins as f64 / total_comparisons as f64
        };
        Self {
            title: title.into(),
            scoring: Scoring::Compared {
                win_rate,
                wins,
                total_comparisons,
            },
            comment: None,
        }
    }

    /// Attach a reviewer comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Scheme this idea was scored under
    pub fn scheme(&self) -> Scheme {
        match self.scoring {
            Scoring::Scored { .. } => Scheme::Absolute,
            Scoring::Compared { .. } => Scheme::Pairwise,
        }
    }

    /// The value the list is ranked by (`score` or `win_rate`)
    pub fn ranking_score(&self) -> f64 {
        match self.scoring {
            Scoring::Scored { score, .. } => score,
            Scoring::Compared { win_rate, .. } => win_rate,
        }
    }
}

/// Error body returned by the service on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Render `detail` as display text; strings verbatim, other JSON compactly
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
