//! Clarification dialogue view

use crate::theme::Theme;
use innovator_api::{ConversationTurn, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget showing the confirmed dialogue, the in-flight user turn and the
/// question awaiting an answer
pub struct Dialogue<'a> {
    turns: &'a [ConversationTurn],
    speculative: Option<&'a ConversationTurn>,
    pending_question: Option<&'a str>,
    error: Option<&'a str>,
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> Dialogue<'a> {
    pub fn new(turns: &'a [ConversationTurn], theme: &'a Theme) -> Self {
        Self {
            turns,
            speculative: None,
            pending_question: None,
            error: None,
            theme,
            scroll: 0,
        }
    }

    /// User turn whose round trip is still outstanding
    pub fn speculative(mut self, turn: Option<&'a ConversationTurn>) -> Self {
        self.speculative = turn;
        self
    }

    pub fn pending_question(mut self, question: Option<&'a str>) -> Self {
        self.pending_question = question;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Number of lines the dialogue occupies at `width`
    pub fn height(&self, width: usize) -> usize {
        self.lines(width).len()
    }

    /// Index of the assistant turn that carries the pending question
    fn question_turn(&self) -> Option<usize> {
        let question = self.pending_question?;
        self.turns
            .iter()
            .rposition(|t| t.role == Role::Assistant && t.content.trim() == question.trim())
    }

    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let content_width = width.saturating_sub(2).max(1);
        let question_turn = self.question_turn();

        for (i, turn) in self.turns.iter().enumerate() {
            let highlighted = question_turn == Some(i);
            let (header, header_style) = match turn.role {
                Role::User => ("▶ You".to_string(), self.theme.accent_bold()),
                Role::Assistant if highlighted => {
                    ("? Question".to_string(), self.theme.question_style())
                }
                Role::Assistant => ("◀ Assistant".to_string(), self.theme.assistant_bold()),
            };
            let body_style = if highlighted {
                self.theme.question_style()
            } else {
                self.theme.base_style()
            };
            push_entry(&mut lines, header, header_style, &turn.content, body_style, content_width);
        }

        // A question with no matching assistant turn is shown on its own
        if let (Some(question), None) = (self.pending_question, question_turn) {
            if self.speculative.is_none() {
                push_entry(
                    &mut lines,
                    "? Question".to_string(),
                    self.theme.question_style(),
                    question,
                    self.theme.question_style(),
                    content_width,
                );
            }
        }

        if let Some(turn) = self.speculative {
            let dim = self.theme.dim_style().add_modifier(Modifier::ITALIC);
            push_entry(
                &mut lines,
                "▶ You (sending)".to_string(),
                dim,
                &turn.content,
                dim,
                content_width,
            );
        }

        if let Some(error) = self.error {
            push_entry(
                &mut lines,
                "● Error".to_string(),
                self.theme.error_style().add_modifier(Modifier::BOLD),
                error,
                self.theme.error_style(),
                content_width,
            );
        }

        lines
    }
}

fn push_entry(
    lines: &mut Vec<Line<'static>>,
    header: String,
    header_style: Style,
    content: &str,
    content_style: Style,
    width: usize,
) {
    lines.push(Line::from(Span::styled(header, header_style)));
    for wrapped in textwrap::wrap(content, width) {
        lines.push(Line::from(Span::styled(
            format!("  {}", wrapped),
            content_style,
        )));
    }
    lines.push(Line::from(""));
}

impl Widget for Dialogue<'_> {
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
    fn test_pending_question_highlighted() {
        let theme = Theme::dark();
        let turns = vec![
            ConversationTurn::user("RL"),
            ConversationTurn::assistant("Which algorithm?"),
        ];
        let dialogue = Dialogue::new(&turns, &theme).pending_question(Some("Which algorithm?"));
        let lines = dialogue.lines(40);

        assert_eq!(text(&lines[0]), "▶ You");
        assert_eq!(text(&lines[3]), "? Question");
        assert_eq!(lines[4].spans[0].style, theme.question_style());
        assert_eq!(dialogue.height(40), 6);
    }

    #[test]
    fn test_fallback_question_rendered_separately() {
        let theme = Theme::dark();
        let turns = vec![ConversationTurn::user("RL")];
        let lines = Dialogue::new(&turns, &theme)
            .pending_question(Some("Could you be more specific?"))
            .lines(40);
        assert!(lines.iter().any(|l| text(l) == "? Question"));
    }

    #[test]
    fn test_speculative_turn_dimmed() {
        let theme = Theme::dark();
        let turns = vec![];
        let pending = ConversationTurn::user("GRPO improvements");
        let lines = Dialogue::new(&turns, &theme)
            .speculative(Some(&pending))
            .lines(40);
        assert_eq!(text(&lines[0]), "▶ You (sending)");
        assert_eq!(text(&lines[1]), "  GRPO improvements");
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.dim));
    }

    #[test]
    fn test_long_turns_wrap() {
        let theme = Theme::dark();
        let turns = vec![ConversationTurn::user("one two three four five six")];
        let lines = Dialogue::new(&turns, &theme).lines(12);
        // header, wrapped body, blank separator
        assert!(lines.len() > 3);
    }
}
