use crate::application::{CalculatorApp, TodoApp};
use crate::presentation::input::InputHandler;
use crate::presentation::ui::{render_calculator, render_todo};
use crate::presentation::view::{CalculatorView, TodoView};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::Frame;
use std::time::Instant;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// An interactive application the event loop can drive.
pub trait Screen {
    fn draw(&self, f: &mut Frame);

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> Control;

    /// Called after every loop iteration to run anything that has come due.
    fn tick(&mut self, _now: Instant) {}

    /// Next time the loop must wake up even without input.
    fn next_deadline(&self) -> Option<Instant> {
        None
    }
}

impl Screen for CalculatorApp {
    fn draw(&self, f: &mut Frame) {
        render_calculator(f, &CalculatorView::from_app(self));
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> Control {
        InputHandler::handle_calculator_key(self, key, modifiers, now)
    }

    fn tick(&mut self, now: Instant) {
        CalculatorApp::tick(self, now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.reset_deadline()
    }
}

impl Screen for TodoApp {
    fn draw(&self, f: &mut Frame) {
        render_todo(f, &TodoView::from_app(self));
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, _now: Instant) -> Control {
        InputHandler::handle_todo_key(self, key, modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use std::time::Duration;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_calculator_screen_draws_display() {
        let now = Instant::now();
        let mut app = CalculatorApp::new(Box::new(MemoryStore::new()), Duration::from_secs(2));
        app.handle_key(KeyCode::Char('4'), KeyModifiers::NONE, now);
        app.handle_key(KeyCode::Char('2'), KeyModifiers::NONE, now);

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Calculator"));
        assert!(text.contains("42"));
    }

    #[test]
    fn test_calculator_screen_deadline_follows_errors() {
        let now = Instant::now();
        let mut app = CalculatorApp::new(Box::new(MemoryStore::new()), Duration::from_secs(2));
        assert!(Screen::next_deadline(&app).is_none());

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, now);
        assert_eq!(Screen::next_deadline(&app), Some(now + Duration::from_secs(2)));
        Screen::tick(&mut app, now + Duration::from_secs(2));
        assert!(Screen::next_deadline(&app).is_none());
        assert!(!app.calculator.has_error());
    }

    #[test]
    fn test_todo_screen_draws_empty_state_and_counters() {
        let app = TodoApp::new(Box::new(MemoryStore::new()), PathBuf::from("todos.csv"));
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No tasks yet"));
        assert!(text.contains("Total: 0"));
        assert!(text.contains("Pending: 0"));
        assert!(app.next_deadline().is_none());
    }
}
