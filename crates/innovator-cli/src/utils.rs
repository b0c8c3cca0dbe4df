//! Shared utilities

use innovator_api::Idea;
use innovator_core::{RankingViolation, SessionEvent};
use innovator_tui::widgets::idea_list::{score_line, summary_line};

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Plain-text rendering of a ranked idea list
pub fn format_ideas(
    ideas: &[Idea],
    total_generated: u32,
    total_comparisons: Option<u32>,
    violation: Option<&RankingViolation>,
) -> String {
    let mut out = summary_line(ideas.len(), total_generated, total_comparisons);
    out.push('\n');
    if let Some(v) = violation {
        out.push_str(&format!("Warning: ranking order looks wrong: {}\n", v));
    }
    for (i, idea) in ideas.iter().enumerate() {
        out.push_str(&format!("\n{:>2}. {}\n", i + 1, idea.title));
        out.push_str(&format!("    {}\n", score_line(idea)));
        if let Some(comment) = idea.comment.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push_str(&format!("    {}\n", comment.replace('\n', "\n    ")));
        }
    }
    out
}

/// Print a session event for the line-oriented front ends
pub fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::ClarifyStart { .. } => {
            println!("[Checking requirement...]");
        }
        SessionEvent::QuestionAsked { question } => {
            println!("\n? {}", question);
        }
        SessionEvent::Clarified { requirement } => {
            println!("\nRequirement confirmed: {}", truncate_chars(requirement, 200));
        }
        SessionEvent::GenerationStart { .. } => {
            println!("[Generating and ranking ideas, this can take a while...]");
        }
        SessionEvent::GenerationEnd {
            ideas,
            total_generated,
            total_comparisons,
            ranking_violation,
        } => {
            println!(
                "\n{}",
                format_ideas(
                    ideas,
                    *total_generated,
                    *total_comparisons,
                    ranking_violation.as_ref()
                )
            );
        }
        SessionEvent::Reset => {
            println!("Started a new session.");
        }
        SessionEvent::Error { message } => {
            eprintln!("\nError: {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("强化学习", 2), "强化...");
    }

    #[test]
    fn test_format_ideas() {
        let ideas = vec![
            Idea::scored("Adaptive KL", 95.0).with_comment("Novel"),
            Idea::scored("Group baselines", 90.0),
        ];
        let text = format_ideas(&ideas, 20, None, None);
        assert!(text.starts_with("Top 2 of 20 generated ideas\n"));
        assert!(text.contains(" 1. Adaptive KL\n    score 95\n    Novel\n"));
        assert!(text.contains(" 2. Group baselines\n"));
    }

    #[test]
    fn test_format_ideas_with_violation() {
        let ideas = vec![Idea::scored("a", 90.0), Idea::scored("b", 95.0)];
        let violation = RankingViolation::OutOfOrder {
            index: 1,
            previous: 90.0,
            current: 95.0,
        };
        let text = format_ideas(&ideas, 2, None, Some(&violation));
        assert!(text.contains("Warning: ranking order looks wrong: idea #2 scores 95"));
    }
}
