//! Ranked idea list

use crate::theme::Theme;
use innovator_api::{Idea, Scoring};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Scores of one idea, formatted for its scheme
pub fn score_line(idea: &Idea) -> String {
    match &idea.scoring {
        Scoring::Scored {
            score,
            innovation_score,
            feasibility_score,
        } => {
            let mut parts = vec![format!("score {}", score)];
            if let Some(v) = innovation_score {
                parts.push(format!("innovation {}", v));
            }
            if let Some(v) = feasibility_score {
                parts.push(format!("feasibility {}", v));
            }
            parts.join(" · ")
        }
        Scoring::Compared {
            win_rate,
            wins,
            total_comparisons,
        } => {
            if *total_comparisons > 0 {
                format!(
                    "win rate {:.1}% ({}/{})",
                    win_rate * 100.0,
                    wins,
                    total_comparisons
                )
            } else {
                format!("win rate {:.1}%", win_rate * 100.0)
            }
        }
    }
}

/// One-line summary above the list
pub fn summary_line(shown: usize, total_generated: u32, total_comparisons: Option<u32>) -> String {
    let mut line = format!("Top {} of {} generated ideas", shown, total_generated);
    if let Some(n) = total_comparisons {
        line.push_str(&format!(" ({} pairwise comparisons)", n));
    }
    line
}

/// Widget listing ideas in service order; rank is position
pub struct IdeaList<'a> {
    ideas: &'a [Idea],
    total_generated: u32,
    total_comparisons: Option<u32>,
    warning: Option<&'a str>,
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> IdeaList<'a> {
    pub fn new(ideas: &'a [Idea], total_generated: u32, theme: &'a Theme) -> Self {
        Self {
            ideas,
            total_generated,
            total_comparisons: None,
            warning: None,
            theme,
            scroll: 0,
        }
    }

    pub fn total_comparisons(mut self, total: Option<u32>) -> Self {
        self.total_comparisons = total;
        self
    }

    /// Ranking problem reported for this result
    pub fn warning(mut self, warning: Option<&'a str>) -> Self {
        self.warning = warning;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn height(&self, width: usize) -> usize {
        self.lines(width).len()
    }

    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                summary_line(self.ideas.len(), self.total_generated, self.total_comparisons),
                self.theme.dim_style(),
            )),
        ];
        if let Some(warning) = self.warning {
            lines.push(Line::from(Span::styled(
                format!("⚠ Ranking order looks wrong: {}", warning),
                self.theme.warning_style(),
            )));
        }
        lines.push(Line::from(""));

        let content_width = width.saturating_sub(5).max(1);
        for (i, idea) in self.ideas.iter().enumerate() {
            let rank = format!("{:>2}. ", i + 1);
            let mut title_lines = textwrap::wrap(&idea.title, content_width).into_iter();
            let first = title_lines.next().map(|c| c.into_owned()).unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(rank, self.theme.accent_bold()),
                Span::styled(first, self.theme.base_style().add_modifier(Modifier::BOLD)),
            ]));
            for rest in title_lines {
                lines.push(Line::from(Span::styled(
                    format!("    {}", rest),
                    self.theme.base_style().add_modifier(Modifier::BOLD),
                )));
            }

            lines.push(Line::from(Span::styled(
                format!("    {}", score_line(idea)),
                self.theme.success_style(),
            )));

            if let Some(comment) = idea.comment.as_deref().filter(|c| !c.trim().is_empty()) {
                for wrapped in textwrap::wrap(comment, content_width) {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", wrapped),
                        self.theme.dim_style(),
                    )));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for IdeaList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_absolute_score_line() {
        let idea = Idea {
            title: "Adaptive KL".into(),
            scoring: Scoring::Scored {
                score: 92.5,
                innovation_score: Some(95.0),
                feasibility_score: Some(88.0),
            },
            comment: None,
        };
        assert_eq!(
            score_line(&idea),
            "score 92.5 · innovation 95 · feasibility 88"
        );
        assert_eq!(score_line(&Idea::scored("x", 90.0)), "score 90");
    }

    #[test]
    fn test_pairwise_score_line() {
        assert_eq!(
            score_line(&Idea::compared("x", 7, 8)),
            "win rate 87.5% (7/8)"
        );
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(3, 20, None), "Top 3 of 20 generated ideas");
        assert_eq!(
            summary_line(2, 12, Some(66)),
            "Top 2 of 12 generated ideas (66 pairwise comparisons)"
        );
    }

    #[test]
    fn test_ranks_follow_service_order() {
        let theme = Theme::dark();
        let ideas = vec![
            Idea::scored("first", 95.0).with_comment("Strong baseline"),
            Idea::scored("second", 90.0),
        ];
        let lines = IdeaList::new(&ideas, 20, &theme).lines(60);
        let rendered: Vec<String> = lines.iter().map(text).collect();

        assert_eq!(rendered[0], "Top 2 of 20 generated ideas");
        assert_eq!(rendered[2], " 1. first");
        assert_eq!(rendered[3], "    score 95");
        assert_eq!(rendered[4], "    Strong baseline");
        assert_eq!(rendered[6], " 2. second");
    }

    #[test]
    fn test_warning_shown() {
        let theme = Theme::dark();
        let ideas = vec![Idea::scored("a", 90.0), Idea::scored("b", 95.0)];
        let lines = IdeaList::new(&ideas, 2, &theme)
            .warning(Some("idea #2 scores 95 after #1 scored 90"))
            .lines(80);
        assert!(text(&lines[1]).contains("idea #2 scores 95"));
        assert_eq!(lines[1].spans[0].style, theme.warning_style());
    }
}
