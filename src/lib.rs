//! pocket - a terminal calculator and task list.
//!
//! Two small interactive applications sharing one binary: a calculator with
//! a persisted operation history, and a task list with filters. Both keep
//! their state in memory, mirror it to local JSON files, and draw it with
//! ratatui.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use application::{CalculatorApp, TodoApp};
pub use domain::{Calculator, TodoList};
