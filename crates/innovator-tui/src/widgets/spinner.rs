//! Animated spinner widget

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Spinner shown while a round trip is outstanding
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Animate relative to `start` so redraws don't restart the cycle
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }

    fn current_frame(&self) -> &'static str {
        frame_at(self.start_time.elapsed())
    }
}

fn frame_at(elapsed: Duration) -> &'static str {
    let index = (elapsed.as_millis() / FRAME_DURATION.as_millis()) as usize;
    SPINNER_FRAMES[index % SPINNER_FRAMES.len()]
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }

        let text = format!("{} {}", self.current_frame(), self.label);
        let span = Span::styled(&text, self.theme.accent_style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_cycle() {
        assert_eq!(frame_at(Duration::ZERO), SPINNER_FRAMES[0]);
        assert_eq!(frame_at(Duration::from_millis(85)), SPINNER_FRAMES[1]);
        assert_eq!(
            frame_at(FRAME_DURATION * SPINNER_FRAMES.len() as u32),
            SPINNER_FRAMES[0]
        );
    }
}
