//! Ranking contract checks for generation results.
//!
//! The service returns ideas already ranked. The client keeps that order
//! as-is and only reports where it breaks the contract.

use innovator_api::{Idea, Scheme};
use serde::{Deserialize, Serialize};

/// A way in which a returned idea list breaks the ranking contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingViolation {
    /// `ideas[index]` ranks higher than the idea before it
    OutOfOrder { index: usize, previous: f64, current: f64 },
    /// The list mixes absolute scores and win rates
    MixedSchemes { index: usize },
}

impl std::fmt::Display for RankingViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfOrder {
                index,
                previous,
                current,
            } => write!(
                f,
                "idea #{} scores {} after #{} scored {}",
                index + 1,
                current,
                index,
                previous
            ),
            Self::MixedSchemes { index } => {
                write!(f, "idea #{} uses a different scoring scheme", index + 1)
            }
        }
    }
}

/// Scheme of a result list (taken from its first idea)
pub fn scheme_of(ideas: &[Idea]) -> Option<Scheme> {
    ideas.first().map(Idea::scheme)
}

/// Check that `ideas` share one scheme and are non-increasing in score
pub fn check_ranking(ideas: &[Idea]) -> Result<(), RankingViolation> {
    let Some(scheme) = scheme_of(ideas) else {
        return Ok(());
    };

    for (index, pair) in ideas.windows(2).enumerate() {
        let index = index + 1;
        if pair[1].scheme() != scheme {
            return Err(RankingViolation::MixedSchemes { index });
        }
        let previous = pair[0].ranking_score();
        let current = pair[1].ranking_score();
        if current > previous {
            return Err(RankingViolation::OutOfOrder {
                index,
                previous,
                current,
            });
        }
    }
    Ok(())
}
