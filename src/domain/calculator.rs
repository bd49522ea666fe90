//! Calculator state machine.
//!
//! The calculator is a single record of display strings plus a pending
//! operation. Every operation mutates the record in place; the visible phase
//! (`Start`, `EnteringFirst`, ...) is derived from it by [`Calculator::phase`].

use super::errors::{CalcError, CalcResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of entries kept in the calculation history.
pub const HISTORY_LIMIT: usize = 10;

const DECIMAL_PLACES: usize = 10;

/// A binary operation the calculator can apply to two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `a % b` is `a * b / 100`.
    Percentage,
}

impl Operation {
    /// Symbol shown between the operands on the display and in history.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "\u{2212}",
            Operation::Multiply => "\u{00d7}",
            Operation::Divide => "\u{00f7}",
            Operation::Percentage => "%",
        }
    }

    /// Applies the operation without rounding.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::DivisionByZero`] when dividing by zero.
    pub fn apply(self, lhs: f64, rhs: f64) -> CalcResult<f64> {
        match self {
            Operation::Add => Ok(lhs + rhs),
            Operation::Subtract => Ok(lhs - rhs),
            Operation::Multiply => Ok(lhs * rhs),
            Operation::Divide if rhs == 0.0 => Err(CalcError::DivisionByZero),
            Operation::Divide => Ok(lhs / rhs),
            Operation::Percentage => Ok(lhs * (rhs / 100.0)),
        }
    }
}

/// The state the calculator is in, as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    EnteringFirst,
    OperationChosen,
    EnteringSecond,
    Result,
    Error,
}

/// One completed calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    #[serde(with = "stored_result")]
    pub result: f64,
    pub timestamp: String,
}

/// JSON has no literal for infinities or NaN. Those results are stored as
/// the strings `"Infinity"`, `"-Infinity"` and `"NaN"`; a `null` result
/// loads as NaN.
mod stored_result {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&super::format_number(*value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Stored>::deserialize(deserializer)? {
            Some(Stored::Number(value)) => Ok(value),
            Some(Stored::Text(text)) => text
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid result '{text}'"))),
            None => Ok(f64::NAN),
        }
    }
}

/// Rounds a computed value to ten decimal places.
///
/// Goes through the fixed-point text form so that results such as
/// `0.1 + 0.2` come back as exactly `0.3`.
pub fn round_result(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", DECIMAL_PLACES, value)
        .parse()
        .unwrap_or(value)
}

/// Formats a number in its shortest decimal form (`12`, `0.3`, `-4.5`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.is_infinite() {
        let text = if value.is_sign_positive() { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        value.to_string()
    }
}

/// Parses the leading number of a display string.
///
/// `"3 +"` parses as `3`; text that does not start with a number, such as an
/// error message or a lone `"."`, yields `None`.
pub fn parse_operand(text: &str) -> Option<f64> {
    let token = text.split_whitespace().next()?;
    token.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Time of day shown next to each history entry, e.g. `3:04:05 PM`.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// The calculator record.
///
/// `operation` is set exactly when `previous_operand` is non-empty.
#[derive(Debug, Clone)]
pub struct Calculator {
    /// Digits being typed, the last result, or an error message
    pub current_operand: String,
    /// First operand followed by the pending operator symbol, or empty
    pub previous_operand: String,
    pub operation: Option<Operation>,
    /// Next digit starts a fresh operand instead of extending the current one
    pub waiting_for_new_operand: bool,
    /// Error currently on display
    pub error: Option<CalcError>,
    history: Vec<HistoryEntry>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            current_operand: "0".to_string(),
            previous_operand: String::new(),
            operation: None,
            waiting_for_new_operand: false,
            error: None,
            history: Vec::new(),
        }
    }
}

impl Calculator {
    /// Creates a calculator in the start state with previously saved history.
    ///
    /// History beyond [`HISTORY_LIMIT`] entries is dropped from the end.
    pub fn with_history(mut history: Vec<HistoryEntry>) -> Self {
        history.truncate(HISTORY_LIMIT);
        Self {
            history,
            ..Self::default()
        }
    }

    /// History entries, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            Phase::Error
        } else if self.operation.is_some() {
            if self.waiting_for_new_operand {
                Phase::OperationChosen
            } else {
                Phase::EnteringSecond
            }
        } else if self.waiting_for_new_operand {
            Phase::Result
        } else if self.current_operand == "0" {
            Phase::Start
        } else {
            Phase::EnteringFirst
        }
    }

    /// Resets everything except the history.
    pub fn clear(&mut self) {
        self.current_operand = "0".to_string();
        self.previous_operand.clear();
        self.operation = None;
        self.waiting_for_new_operand = false;
        self.error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Appends a digit or decimal point to the current operand.
    ///
    /// Other characters are ignored.
    pub fn append(&mut self, input: char) {
        if !(input.is_ascii_digit() || input == '.') {
            return;
        }
        self.reset_if_error();

        if self.waiting_for_new_operand {
            self.current_operand = if input == '.' {
                "0.".to_string()
            } else {
                input.to_string()
            };
            self.waiting_for_new_operand = false;
            return;
        }

        if self.current_operand == "0" && input != '.' {
            self.current_operand = input.to_string();
            return;
        }

        if input == '.' && self.current_operand.contains('.') {
            return;
        }
        self.current_operand.push(input);
    }

    /// Removes the last character of the current operand.
    pub fn delete_last(&mut self) {
        self.reset_if_error();
        if self.current_operand.chars().count() <= 1 {
            self.current_operand = "0".to_string();
        } else {
            self.current_operand.pop();
        }
    }

    /// Records `operation` as pending, evaluating any operation already
    /// pending first.
    ///
    /// # Errors
    ///
    /// Propagates the error of the chained evaluation; the new operation is
    /// not recorded in that case.
    pub fn choose_operation(
        &mut self,
        operation: Operation,
        at: &DateTime<Local>,
    ) -> CalcResult<()> {
        self.reset_if_error();
        if !self.previous_operand.is_empty() {
            self.evaluate(at)?;
        }

        self.operation = Some(operation);
        self.previous_operand = format!("{} {}", self.current_operand, operation.symbol());
        self.waiting_for_new_operand = true;
        debug!(operation = ?operation, previous = %self.previous_operand, "operation chosen");
        Ok(())
    }

    /// Evaluates the pending operation and records it in the history.
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] when either operand is not a number (also
    /// when nothing is pending), [`CalcError::DivisionByZero`] when dividing
    /// by zero. The error message replaces the current operand.
    pub fn evaluate(&mut self, at: &DateTime<Local>) -> CalcResult<f64> {
        self.reset_if_error();
        let lhs = parse_operand(&self.previous_operand);
        let rhs = parse_operand(&self.current_operand);

        let (Some(lhs), Some(rhs), Some(operation)) = (lhs, rhs, self.operation) else {
            return Err(self.fail(CalcError::InvalidInput));
        };

        let value = match operation.apply(lhs, rhs) {
            Ok(value) => round_result(value),
            Err(error) => return Err(self.fail(error)),
        };

        let entry = HistoryEntry {
            expression: format!(
                "{} {} {}",
                format_number(lhs),
                operation.symbol(),
                format_number(rhs)
            ),
            result: value,
            timestamp: format_timestamp(at),
        };
        debug!(expression = %entry.expression, result = value, "evaluated");
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_LIMIT);

        self.current_operand = format_number(value);
        self.previous_operand.clear();
        self.operation = None;
        self.waiting_for_new_operand = true;
        Ok(value)
    }

    /// The `%` key.
    ///
    /// With nothing pending, divides the current operand by 100 in place.
    /// Otherwise chooses [`Operation::Percentage`].
    pub fn percent(&mut self, at: &DateTime<Local>) -> CalcResult<()> {
        self.reset_if_error();
        if !self.previous_operand.is_empty() {
            return self.choose_operation(Operation::Percentage, at);
        }

        let Some(value) = parse_operand(&self.current_operand) else {
            return Err(self.fail(CalcError::InvalidInput));
        };
        self.current_operand = format_number(round_result(value / 100.0));
        Ok(())
    }

    fn fail(&mut self, error: CalcError) -> CalcError {
        debug!(%error, "calculation failed");
        self.current_operand = error.to_string();
        self.error = Some(error);
        error
    }

    fn reset_if_error(&mut self) {
        if self.error.is_some() {
            self.clear();
        }
    }
}
