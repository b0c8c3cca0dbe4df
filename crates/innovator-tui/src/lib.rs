//! innovator-tui: Terminal UI components
//!
//! Widgets for the clarification dialogue and the ranked idea list, built
//! on ratatui and crossterm.

pub mod input;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use terminal::TerminalGuard;
pub use theme::Theme;
