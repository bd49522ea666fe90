//! Application layer managing state and user workflows.
//!
//! This module sits between the domain models and the terminal UI: it owns
//! the calculator and task list, persists them, and tracks UI state such as
//! modes, warnings and the delayed error reset.

pub mod calculator;
pub mod timer;
pub mod todo;

pub use calculator::*;
pub use timer::*;
pub use todo::*;
