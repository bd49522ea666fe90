//! Projections of application state into what is shown on screen.
//!
//! Views are plain data computed from the applications, so everything the
//! user sees can be checked without a terminal.

use crate::application::{CalculatorApp, TodoApp, TodoMode};
use crate::domain::{Filter, format_number};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLine {
    pub expression: String,
    pub result: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorView {
    pub current: String,
    pub previous: String,
    pub is_error: bool,
    pub history: Vec<HistoryLine>,
    pub status: Option<String>,
    pub show_help: bool,
}

impl CalculatorView {
    pub fn from_app(app: &CalculatorApp) -> Self {
        let calculator = &app.calculator;
        Self {
            current: calculator.current_operand.clone(),
            previous: calculator.previous_operand.clone(),
            is_error: calculator.has_error(),
            history: calculator
                .history()
                .iter()
                .map(|entry| HistoryLine {
                    expression: entry.expression.clone(),
                    result: format_number(entry.result),
                    timestamp: entry.timestamp.clone(),
                })
                .collect(),
            status: app.status_message.clone(),
            show_help: app.show_help,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoRow {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub selected: bool,
}

/// The input field while it has focus.
#[derive(Debug, Clone, PartialEq)]
pub struct InputLine {
    pub title: &'static str,
    pub text: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoView {
    pub filter: Filter,
    pub rows: Vec<TodoRow>,
    /// Banner shown instead of the list when the filtered view is empty
    pub empty_message: Option<&'static str>,
    pub total: String,
    pub completed: String,
    pub pending: String,
    pub input: Option<InputLine>,
    pub prompt: Option<String>,
    pub warning: Option<String>,
    pub status: Option<String>,
    pub show_help: bool,
}

impl TodoView {
    pub fn from_app(app: &TodoApp) -> Self {
        let rows: Vec<TodoRow> = app
            .visible()
            .into_iter()
            .enumerate()
            .map(|(index, todo)| TodoRow {
                id: todo.id,
                text: todo.text.clone(),
                completed: todo.completed,
                selected: index == app.selected,
            })
            .collect();

        let empty_message = rows.is_empty().then(|| match app.filter {
            Filter::All => "No tasks yet. Press 'a' to add one.",
            Filter::Pending => "No pending tasks.",
            Filter::Completed => "No completed tasks.",
        });

        let input = match app.mode {
            TodoMode::Adding => Some("New task"),
            TodoMode::Editing { .. } => Some("Edit task"),
            _ => None,
        }
        .map(|title| InputLine {
            title,
            text: app.input.clone(),
            cursor: app.cursor_position,
        });

        let counts = app.list().counts();
        Self {
            filter: app.filter,
            rows,
            empty_message,
            total: format!("Total: {}", counts.total),
            completed: format!("Completed: {}", counts.completed),
            pending: format!("Pending: {}", counts.pending),
            input,
            prompt: app.confirmation_prompt(),
            warning: app.warning.clone(),
            status: app.status_message.clone(),
            show_help: app.mode == TodoMode::Help,
        }
    }
}
