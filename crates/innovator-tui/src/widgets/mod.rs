//! Custom widgets for the TUI

pub mod dialogue;
pub mod idea_list;
pub mod input_box;
pub mod spinner;

pub use dialogue::Dialogue;
pub use idea_list::IdeaList;
pub use input_box::InputBox;
pub use spinner::Spinner;
