//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    Backspace,
    Delete,
    Left,
    Right,
    /// Scroll the dialogue up
    Up,
    /// Scroll the dialogue down
    Down,
    Home,
    End,
    /// Scroll the idea list up
    PageUp,
    /// Scroll the idea list down
    PageDown,
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+R (start a new session)
    Reset,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Bracketed paste
    Paste(String),
    /// Unknown/unhandled
    Unknown,
}

impl Action {
    /// Actions that leave the application
    pub fn is_quit(&self) -> bool {
        matches!(self, Action::Escape | Action::Interrupt)
    }
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('r') => Action::Reset,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            Action::Reset
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Interrupt
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Action::Unknown
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('r'), KeyModifiers::NONE)),
            Action::Char('r')
        );
        assert_eq!(
            key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::Submit
        );
        assert!(key_to_action(key(KeyCode::Esc, KeyModifiers::NONE)).is_quit());
    }

    #[test]
    fn test_paste_event() {
        assert_eq!(
            event_to_action(Event::Paste("GRPO".into())),
            Some(Action::Paste("GRPO".into()))
        );
        assert_eq!(event_to_action(Event::FocusGained), None);
    }

    #[test]
    fn test_mouse_events_ignored() {
        use crossterm::event::{MouseEvent, MouseEventKind};
        let scroll = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(event_to_action(scroll), None);
    }
}
