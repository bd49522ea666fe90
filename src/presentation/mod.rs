//! Presentation layer handling terminal UI and user input.
//!
//! Application state is projected into plain views, drawn with ratatui,
//! and driven by crossterm key events through the [`Screen`] trait.

pub mod input;
pub mod screen;
pub mod ui;
pub mod view;

pub use input::*;
pub use screen::*;
pub use ui::*;
pub use view::*;
