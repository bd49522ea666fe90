//! Calculator application state.
//!
//! Wraps the [`Calculator`] state machine with persistence of the history,
//! the delayed reset after an error, and UI-only state such as the help
//! overlay and status line.

use crate::application::timer::ResetTimer;
use crate::domain::{CalcResult, Calculator, HistoryEntry, Operation};
use crate::infrastructure::{
    CALCULATOR_HISTORY_KEY, ClipboardError, KeyValueStore, load_json, save_json,
};
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Calculator together with everything the running program owns around it.
pub struct CalculatorApp {
    /// The calculator record
    pub calculator: Calculator,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Whether the help overlay is shown
    pub show_help: bool,
    store: Box<dyn KeyValueStore>,
    reset_timer: ResetTimer,
    error_display: Duration,
}

impl CalculatorApp {
    /// Creates the application, restoring history from `store`.
    ///
    /// Unreadable history is logged and ignored.
    pub fn new(store: Box<dyn KeyValueStore>, error_display: Duration) -> Self {
        let history = match load_json::<Vec<HistoryEntry>>(&*store, CALCULATOR_HISTORY_KEY) {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not load calculator history");
                Vec::new()
            }
        };
        info!(entries = history.len(), "Calculator history loaded");

        Self {
            calculator: Calculator::with_history(history),
            status_message: None,
            show_help: false,
            store,
            reset_timer: ResetTimer::default(),
            error_display,
        }
    }

    pub fn append(&mut self, input: char) {
        self.begin_action();
        self.calculator.append(input);
    }

    pub fn delete_last(&mut self) {
        self.begin_action();
        self.calculator.delete_last();
    }

    pub fn clear(&mut self) {
        self.begin_action();
        self.calculator.clear();
    }

    /// Chooses an operation, evaluating the pending one first if there is one.
    pub fn choose_operation(&mut self, operation: Operation, now: Instant) {
        self.begin_action();
        let chained = !self.calculator.previous_operand.is_empty();
        let result = self.calculator.choose_operation(operation, &Local::now());
        self.finish(result, chained, now);
    }

    pub fn evaluate(&mut self, now: Instant) {
        self.begin_action();
        let result = self.calculator.evaluate(&Local::now()).map(|_| ());
        self.finish(result, true, now);
    }

    /// The `%` key: standalone percentage or the percentage operation.
    pub fn percent(&mut self, now: Instant) {
        self.begin_action();
        let chained = !self.calculator.previous_operand.is_empty();
        let result = self.calculator.percent(&Local::now());
        self.finish(result, chained, now);
    }

    /// Empties the history and removes it from storage.
    pub fn clear_history(&mut self) {
        self.begin_action();
        self.calculator.clear_history();
        if let Err(e) = self.store.remove(CALCULATOR_HISTORY_KEY) {
            warn!(error = %e, "Could not remove calculator history");
        }
        self.status_message = Some("History cleared".to_string());
    }

    pub fn toggle_help(&mut self) {
        self.begin_action();
        self.show_help = !self.show_help;
    }

    /// Value that can be copied to the clipboard, if any.
    pub fn copyable_value(&self) -> Option<&str> {
        (!self.calculator.has_error()).then_some(self.calculator.current_operand.as_str())
    }

    /// Records the outcome of copying `value` to the clipboard.
    pub fn set_copy_result(&mut self, value: &str, result: Result<(), ClipboardError>) {
        match result {
            Ok(()) => self.status_message = Some(format!("Copied {value}")),
            Err(e) => {
                warn!(error = %e, "Clipboard copy failed");
                self.status_message = Some(format!("Copy failed: {e}"));
            }
        }
    }

    /// Resets the calculator once an error has been on display long enough.
    pub fn tick(&mut self, now: Instant) {
        if self.reset_timer.fire_if_due(now) {
            debug!("error display expired");
            self.calculator.clear();
        }
    }

    /// When the pending error reset is due, if one is scheduled.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_timer.deadline()
    }

    /// Any user action cancels a pending reset and dismisses the error it
    /// was going to clear.
    fn begin_action(&mut self) {
        self.status_message = None;
        if self.reset_timer.cancel() {
            debug!("pending error reset cancelled");
        }
        if self.calculator.has_error() {
            self.calculator.clear();
        }
    }

    fn finish(&mut self, result: CalcResult<()>, evaluated: bool, now: Instant) {
        match result {
            Ok(()) if evaluated => self.save_history(),
            Ok(()) => {}
            Err(_) => self.reset_timer.schedule(now, self.error_display),
        }
    }

    fn save_history(&mut self) {
        if let Err(e) = save_json(
            &mut *self.store,
            CALCULATOR_HISTORY_KEY,
            self.calculator.history(),
        ) {
            warn!(error = %e, "Could not save calculator history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalcError, HISTORY_LIMIT, Phase};
    use crate::infrastructure::{FailingStore, MemoryStore};

    const DELAY: Duration = Duration::from_secs(2);

    fn app() -> CalculatorApp {
        CalculatorApp::new(Box::new(MemoryStore::new()), DELAY)
    }

    fn stored_history(app: &CalculatorApp) -> Option<Vec<HistoryEntry>> {
        load_json(&*app.store, CALCULATOR_HISTORY_KEY).unwrap()
    }

    #[test]
    fn test_new_app_starts_clean() {
        let app = app();
        assert_eq!(app.calculator.phase(), Phase::Start);
        assert!(app.calculator.history().is_empty());
        assert!(app.reset_deadline().is_none());
        assert!(!app.show_help);
    }

    #[test]
    fn test_history_persisted_after_evaluation() {
        let now = Instant::now();
        let mut app = app();
        app.append('3');
        app.choose_operation(Operation::Add, now);
        assert!(stored_history(&app).is_none());
        app.append('4');
        app.evaluate(now);

        let stored = stored_history(&app).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].expression, "3 + 4");
        assert_eq!(stored[0].result, 7.0);
    }

    #[test]
    fn test_chained_operation_persists_history() {
        let now = Instant::now();
        let mut app = app();
        app.append('2');
        app.choose_operation(Operation::Multiply, now);
        app.append('5');
        app.choose_operation(Operation::Subtract, now);

        assert_eq!(app.calculator.current_operand, "10");
        assert_eq!(stored_history(&app).unwrap().len(), 1);
    }

    #[test]
    fn test_history_restored_on_startup() {
        let mut store = MemoryStore::new();
        let entries: Vec<HistoryEntry> = (0..12)
            .map(|n| HistoryEntry {
                expression: format!("{n} + 1"),
                result: (n + 1) as f64,
                timestamp: "9:00:00 AM".to_string(),
            })
            .collect();
        save_json(&mut store, CALCULATOR_HISTORY_KEY, &entries).unwrap();

        let app = CalculatorApp::new(Box::new(store), DELAY);
        assert_eq!(app.calculator.history().len(), HISTORY_LIMIT);
        assert_eq!(app.calculator.history()[0], entries[0]);
    }

    #[test]
    fn test_corrupt_history_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(CALCULATOR_HISTORY_KEY, "{broken").unwrap();
        let app = CalculatorApp::new(Box::new(store), DELAY);
        assert!(app.calculator.history().is_empty());
    }

    #[test]
    fn test_overflowing_result_survives_reload() {
        let now = Instant::now();
        let mut app = app();
        app.append('1');
        app.append('0');
        for _ in 0..12 {
            app.choose_operation(Operation::Multiply, now);
        }
        assert_eq!(app.calculator.current_operand, "Infinity");
        assert!(app.calculator.history()[0].result.is_infinite());

        let json = app.store.get(CALCULATOR_HISTORY_KEY).unwrap().unwrap();
        let mut store = MemoryStore::new();
        store.set(CALCULATOR_HISTORY_KEY, &json).unwrap();
        let reopened = CalculatorApp::new(Box::new(store), DELAY);
        assert_eq!(reopened.calculator.history().len(), HISTORY_LIMIT);
        assert_eq!(reopened.calculator.history(), app.calculator.history());
    }

    #[test]
    fn test_storage_failures_keep_memory_state() {
        let now = Instant::now();
        let mut app = CalculatorApp::new(Box::new(FailingStore), DELAY);
        app.append('3');
        app.choose_operation(Operation::Add, now);
        app.append('4');
        app.evaluate(now);
        assert_eq!(app.calculator.current_operand, "7");
        assert_eq!(app.calculator.history().len(), 1);
        assert_eq!(app.calculator.history()[0].expression, "3 + 4");

        app.clear_history();
        assert!(app.calculator.history().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("History cleared"));
    }

    #[test]
    fn test_division_by_zero_resets_after_delay() {
        let start = Instant::now();
        let mut app = app();
        app.append('8');
        app.choose_operation(Operation::Divide, start);
        app.append('0');
        app.evaluate(start);

        assert_eq!(app.calculator.error, Some(CalcError::DivisionByZero));
        assert_eq!(app.calculator.current_operand, "Cannot divide by zero");
        assert_eq!(app.reset_deadline(), Some(start + DELAY));

        app.tick(start + Duration::from_millis(1500));
        assert_eq!(app.calculator.phase(), Phase::Error);

        app.tick(start + DELAY);
        assert_eq!(app.calculator.phase(), Phase::Start);
        assert_eq!(app.calculator.current_operand, "0");
        assert!(app.reset_deadline().is_none());
    }

    #[test]
    fn test_user_action_cancels_pending_reset() {
        let start = Instant::now();
        let mut app = app();
        app.evaluate(start);
        assert_eq!(app.calculator.error, Some(CalcError::InvalidInput));
        assert!(app.reset_deadline().is_some());

        app.append('4');
        assert!(app.reset_deadline().is_none());
        assert_eq!(app.calculator.current_operand, "4");

        app.choose_operation(Operation::Add, start);
        app.append('1');
        // The cancelled reset must not wipe the new calculation.
        app.tick(start + DELAY * 2);
        assert_eq!(app.calculator.current_operand, "1");
        assert_eq!(app.calculator.previous_operand, "4 +");
    }

    #[test]
    fn test_errors_are_not_persisted() {
        let now = Instant::now();
        let mut app = app();
        app.append('1');
        app.choose_operation(Operation::Divide, now);
        app.append('0');
        app.evaluate(now);
        assert!(stored_history(&app).is_none());
    }

    #[test]
    fn test_clear_history_removes_stored_key() {
        let now = Instant::now();
        let mut app = app();
        app.append('1');
        app.choose_operation(Operation::Add, now);
        app.append('1');
        app.evaluate(now);
        assert!(stored_history(&app).is_some());

        app.clear_history();
        assert!(app.calculator.history().is_empty());
        assert!(stored_history(&app).is_none());
        assert_eq!(app.status_message.as_deref(), Some("History cleared"));
    }

    #[test]
    fn test_copyable_value() {
        let now = Instant::now();
        let mut app = app();
        app.append('9');
        assert_eq!(app.copyable_value(), Some("9"));

        app.evaluate(now);
        assert_eq!(app.copyable_value(), None);
    }

    #[test]
    fn test_set_copy_result() {
        let mut app = app();
        app.set_copy_result("42", Ok(()));
        assert_eq!(app.status_message.as_deref(), Some("Copied 42"));
    }

    #[test]
    fn test_help_toggle_dismisses_error() {
        let now = Instant::now();
        let mut app = app();
        app.evaluate(now);
        app.toggle_help();
        assert!(app.show_help);
        assert!(!app.calculator.has_error());
        assert!(app.reset_deadline().is_none());
    }
}
