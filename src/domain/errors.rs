use thiserror::Error;

/// Failures of a calculator evaluation.
///
/// The `Display` text is exactly what the calculator shows in place of the
/// current operand while the error is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Invalid input")]
    InvalidInput,
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

/// Task list policy violations, reported to the user as warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("Please enter a task")]
    EmptyText,
    #[error("No completed tasks to clear")]
    NoCompletedTasks,
    #[error("No tasks to clear")]
    NoTasks,
    #[error("No task ids left; clear all tasks to continue")]
    IdsExhausted,
}

pub type CalcResult<T> = Result<T, CalcError>;
