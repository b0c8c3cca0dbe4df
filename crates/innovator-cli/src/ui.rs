//! TUI implementation for innovator

use std::sync::Arc;
use std::time::Instant;

use crossterm::event::EventStream;
use futures::{FutureExt, StreamExt, future::BoxFuture, stream::FuturesUnordered};
use innovator_api::IdeaService;
use innovator_core::{
    Completion, ConversationState, Effect, Error, GenerationState, Session, execute,
};
use innovator_tui::{
    TerminalGuard, Theme,
    input::{Action, event_to_action},
    widgets::{Dialogue, IdeaList, InputBox, Spinner},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::commands::{CommandResult, execute_command};
use crate::utils::truncate_chars;

/// What the event loop should do after an action
#[derive(Debug)]
pub enum UiMessage {
    /// Start a request
    Dispatch(Effect),
    /// Leave the application
    Quit,
}

/// TUI application state
pub struct TuiState {
    session: Session,
    input: InputBox,
    theme: Theme,
    /// Dialogue scroll; `usize::MAX` follows the bottom
    dialogue_scroll: usize,
    idea_scroll: usize,
    /// Output of a slash command, shown until dismissed
    notice: Option<String>,
    spinner_start: Instant,
    base_url: String,
}

impl TuiState {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut state = Self {
            session: Session::new(),
            input: InputBox::new(),
            theme: Theme::dark(),
            dialogue_scroll: usize::MAX,
            idea_scroll: 0,
            notice: None,
            spinner_start: Instant::now(),
            base_url: base_url.into(),
        };
        state.sync_input();
        state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Feed a finished request back into the session
    pub fn apply(&mut self, completion: Completion) -> Option<Effect> {
        let next = self.session.apply(completion);
        if next.is_some() {
            self.spinner_start = Instant::now();
        }
        if self.session.generation().outcome().is_some() {
            self.idea_scroll = 0;
        }
        self.dialogue_scroll = usize::MAX;
        self.sync_input();
        next
    }

    fn reset(&mut self) {
        self.session.reset();
        self.input.clear();
        self.notice = None;
        self.dialogue_scroll = usize::MAX;
        self.idea_scroll = 0;
        self.sync_input();
    }

    /// Enable the input only when a submission would be accepted
    fn sync_input(&mut self) {
        let conversation = self.session.conversation();
        let (enabled, hint) = if conversation.is_loading() {
            (false, "Waiting for the service...")
        } else if conversation.state() == ConversationState::Clarified {
            (false, "Requirement confirmed. Ctrl+R starts a new session.")
        } else {
            (true, "")
        };
        self.input.set_enabled(enabled, hint);

        if conversation.expects_initial() {
            self.input.set_title("Requirement");
            self.input
                .set_placeholder("Describe the research direction you want ideas for...");
        } else {
            self.input.set_title("Answer");
            self.input.set_placeholder("Answer the question above...");
        }
    }

    /// Handle keyboard action
    pub fn handle_action(&mut self, action: Action, width: u16) -> Option<UiMessage> {
        if self.notice.is_some() {
            match action {
                Action::Escape | Action::Submit => {
                    self.notice = None;
                    return None;
                }
                Action::Interrupt => return Some(UiMessage::Quit),
                _ => {}
            }
        }

        match action {
            Action::Submit => self.submit(),
            action if action.is_quit() => Some(UiMessage::Quit),
            Action::Reset => {
                if self.session.can_reset() {
                    self.reset();
                }
                None
            }
            Action::Up => {
                self.dialogue_scroll = self.dialogue_scroll.saturating_sub(1);
                None
            }
            Action::Down => {
                self.dialogue_scroll = self.dialogue_scroll.saturating_add(1);
                None
            }
            Action::PageUp => {
                self.idea_scroll = self.idea_scroll.saturating_sub(5);
                None
            }
            Action::PageDown => {
                self.idea_scroll = self.idea_scroll.saturating_add(5);
                None
            }
            _ => {
                self.input.handle_action(&action, width);
                None
            }
        }
    }

    fn submit(&mut self) -> Option<UiMessage> {
        // Commands run even while submissions are disabled
        if self.input.is_command() {
            let content = self.input.take();
            return self.run_command(&content);
        }
        if !self.input.is_enabled() {
            return None;
        }
        let content = self.input.content().to_string();

        match self.session.submit(&content) {
            Ok(effect) => {
                self.input.clear();
                self.notice = None;
                self.spinner_start = Instant::now();
                self.dialogue_scroll = usize::MAX;
                self.sync_input();
                Some(UiMessage::Dispatch(effect))
            }
            // Shown from the session's validation error
            Err(Error::Validation(_)) => None,
            Err(e) => {
                self.notice = Some(e.to_string());
                None
            }
        }
    }

    fn run_command(&mut self, content: &str) -> Option<UiMessage> {
        match execute_command(content, &self.session)? {
            CommandResult::Reset => self.reset(),
            CommandResult::Message(msg) => self.notice = Some(msg),
            CommandResult::Exit => return Some(UiMessage::Quit),
            CommandResult::Unknown(cmd) => {
                self.notice = Some(format!(
                    "Unknown command: /{}\nType /help for available commands.",
                    cmd
                ));
            }
        }
        None
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Panes
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(size);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[0]);

        self.render_dialogue(frame, panes[0]);
        self.render_ideas(frame, panes[1]);
        self.render_status(frame, chunks[1]);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn render_dialogue(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" innovator │ {} ", self.session.conversation().state());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let conversation = self.session.conversation();
        let untouched = !conversation.has_started() && conversation.validation_error().is_none();
        if inner.height == 0 || untouched {
            frame.render_widget(welcome(&self.base_url), inner);
            return;
        }

        let error = conversation
            .last_error()
            .filter(|_| conversation.state() == ConversationState::Error)
            .or(conversation.validation_error());
        let dialogue = Dialogue::new(conversation.turns(), &self.theme)
            .speculative(conversation.speculative_turn())
            .pending_question(conversation.pending_question())
            .error(error);

        let height = dialogue.height(inner.width as usize);
        let max_scroll = height.saturating_sub(inner.height as usize);
        self.dialogue_scroll = self.dialogue_scroll.min(max_scroll);

        frame.render_widget(dialogue.scroll(self.dialogue_scroll), inner);
    }

    fn render_ideas(&mut self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = &self.notice {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.accent_style())
                .title(" Info │ Esc to close ");
            let paragraph = Paragraph::new(notice.as_str())
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
            return;
        }

        let generation = self.session.generation();
        let title = match generation.state() {
            GenerationState::NotStarted => " Ideas ".to_string(),
            GenerationState::InFlight { requirement } | GenerationState::Failed { requirement, .. } => {
                format!(" Ideas │ {} ", truncate_chars(requirement, 40))
            }
            GenerationState::Succeeded { outcome } => {
                format!(" Ideas │ {} ", truncate_chars(&outcome.requirement, 40))
            }
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match generation.state() {
            GenerationState::Succeeded { outcome } => {
                let warning = outcome.ranking_violation.as_ref().map(|v| v.to_string());
                let list = IdeaList::new(&outcome.ideas, outcome.total_generated, &self.theme)
                    .total_comparisons(outcome.total_comparisons)
                    .warning(warning.as_deref());
                let height = list.height(inner.width as usize);
                self.idea_scroll = self
                    .idea_scroll
                    .min(height.saturating_sub(inner.height as usize));
                frame.render_widget(list.scroll(self.idea_scroll), inner);
            }
            GenerationState::Failed { last_error, .. } => {
                let text = vec![
                    Line::from(Span::styled(
                        format!("Error: {}", last_error),
                        self.theme.error_style(),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Press Ctrl+R to start a new session.",
                        self.theme.dim_style(),
                    )),
                ];
                frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
            }
            GenerationState::InFlight { .. } => {
                let text = Line::from(Span::styled(
                    "Generating and ranking ideas, this can take a while...",
                    self.theme.dim_style(),
                ));
                frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
            }
            GenerationState::NotStarted => {
                let text = Line::from(Span::styled(
                    "Ideas appear here once the requirement is clear.",
                    self.theme.dim_style(),
                ));
                frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.session.is_loading() {
            let label = if self.session.conversation().is_loading() {
                "Clarifying requirement..."
            } else {
                "Generating ideas..."
            };
            let spinner = Spinner::new(label, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left = match self.session.generation().state() {
            GenerationState::Succeeded { outcome } => {
                format!("Done │ {} ideas", outcome.ideas.len())
            }
            GenerationState::Failed { .. } => "Generation failed".to_string(),
            _ => match self.session.conversation().state() {
                ConversationState::Idle => "Ready".to_string(),
                ConversationState::AwaitingClarification => "Waiting for your answer".to_string(),
                ConversationState::Error => "Request failed, submit to retry".to_string(),
                ConversationState::Clarified => "Clarified".to_string(),
            },
        };
        let right = if self.session.can_reset() {
            "Enter: send │ Ctrl+R: new session │ PgUp/Dn: ideas │ Esc: quit"
        } else {
            "Enter: send │ /help │ Esc: quit"
        };

        let available = area.width as usize;
        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left, self.theme.dim_style()),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(right, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(left, self.theme.dim_style()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn welcome(base_url: &str) -> Paragraph<'static> {
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::styled(what, Style::default().fg(Color::White)),
        ])
    };
    Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  innovator",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " - research idea generator",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Service: {}", base_url),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Keybindings",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        key("    Enter     ", "Send requirement / answer"),
        key("    Ctrl+R    ", "New session"),
        key("    ↑/↓       ", "Scroll dialogue"),
        key("    PgUp/Dn   ", "Scroll ideas"),
        key("    Esc       ", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Describe a research requirement to get started...",
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn spawn_effect(service: Arc<dyn IdeaService>, effect: Effect) -> BoxFuture<'static, Completion> {
    async move { execute(service.as_ref(), effect).await }.boxed()
}

/// Run the TUI application
pub async fn run_tui(service: Arc<dyn IdeaService>, base_url: &str) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::new()?;
    let mut state = TuiState::new(base_url);
    let mut event_stream = EventStream::new();
    let mut in_flight: FuturesUnordered<BoxFuture<'static, Completion>> = FuturesUnordered::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    loop {
        guard.terminal_mut().draw(|frame| state.render(frame))?;
        let area_width = guard.width()?;

        tokio::select! {
            Some(completion) = in_flight.next(), if !in_flight.is_empty() => {
                if let Some(next) = state.apply(completion) {
                    in_flight.push(spawn_effect(Arc::clone(&service), next));
                }
            }

            event = event_stream.next() => {
                let action = match event {
                    Some(Ok(event)) => match event_to_action(event) {
                        Some(action) => action,
                        None => continue,
                    },
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => return Ok(()),
                };
                match state.handle_action(action, area_width) {
                    Some(UiMessage::Dispatch(effect)) => {
                        in_flight.push(spawn_effect(Arc::clone(&service), effect));
                    }
                    Some(UiMessage::Quit) => return Ok(()),
                    None => {}
                }
            }

            // Tick for animations (spinner updates)
            _ = tick_interval.tick() => {}
        }
    }
}
