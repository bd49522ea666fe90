use crate::application::{CalculatorApp, TodoApp, TodoMode};
use crate::domain::{Filter, Operation};
use crate::infrastructure::{CsvExporter, copy_to_clipboard};
use crate::presentation::screen::Control;
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_calculator_key(
        app: &mut CalculatorApp,
        key: KeyCode,
        modifiers: KeyModifiers,
        now: Instant,
    ) -> Control {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') => return Control::Quit,
                KeyCode::Char('l') => app.clear_history(),
                KeyCode::Char('y') => match app.copyable_value().map(str::to_string) {
                    Some(value) => {
                        let result = copy_to_clipboard(&value);
                        app.set_copy_result(&value, result);
                    }
                    None => app.status_message = Some("Nothing to copy".to_string()),
                },
                _ => {}
            }
            return Control::Continue;
        }

        if app.show_help {
            if matches!(
                key,
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.toggle_help();
            }
            return Control::Continue;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => app.append(c),
            KeyCode::Char('+') => app.choose_operation(Operation::Add, now),
            KeyCode::Char('-') => app.choose_operation(Operation::Subtract, now),
            KeyCode::Char('*') | KeyCode::Char('x') => {
                app.choose_operation(Operation::Multiply, now)
            }
            KeyCode::Char('/') => app.choose_operation(Operation::Divide, now),
            KeyCode::Char('%') => app.percent(now),
            KeyCode::Enter | KeyCode::Char('=') => app.evaluate(now),
            KeyCode::Esc | KeyCode::Delete => app.clear(),
            KeyCode::Backspace => app.delete_last(),
            KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help(),
            KeyCode::Char('q') => return Control::Quit,
            _ => {}
        }
        Control::Continue
    }

    pub fn handle_todo_key(app: &mut TodoApp, key: KeyCode, modifiers: KeyModifiers) -> Control {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return Control::Quit;
        }

        // Warnings last until the next key press
        app.dismiss_messages();

        match app.mode {
            TodoMode::Normal => return Self::handle_todo_normal(app, key, modifiers),
            TodoMode::Adding | TodoMode::Editing { .. } => Self::handle_todo_input(app, key),
            TodoMode::Confirm(_) => Self::handle_todo_confirm(app, key),
            TodoMode::Help => {
                if matches!(
                    key,
                    KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
                ) {
                    app.toggle_help();
                }
            }
        }
        Control::Continue
    }

    fn handle_todo_normal(app: &mut TodoApp, key: KeyCode, modifiers: KeyModifiers) -> Control {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if key == KeyCode::Char('e') {
                let result = CsvExporter::export_todos(app.list().todos(), app.export_path());
                app.set_export_result(result);
            }
            return Control::Continue;
        }

        match key {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('a') | KeyCode::Char('i') => app.start_adding(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
            KeyCode::Enter | KeyCode::Char('e') => app.start_editing_selected(),
            KeyCode::Delete | KeyCode::Char('d') => app.request_delete_selected(),
            KeyCode::Char('c') => app.request_clear_completed(),
            KeyCode::Char('C') => app.request_clear_all(),
            KeyCode::Char('f') => app.cycle_filter(),
            KeyCode::Char('1') => app.set_filter(Filter::All),
            KeyCode::Char('2') => app.set_filter(Filter::Pending),
            KeyCode::Char('3') => app.set_filter(Filter::Completed),
            KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
        Control::Continue
    }

    fn handle_todo_input(app: &mut TodoApp, key: KeyCode) {
        let editing = matches!(app.mode, TodoMode::Editing { .. });
        match key {
            KeyCode::Enter if editing => app.commit_edit(),
            // Leaving the field commits an edit, like losing focus
            KeyCode::Tab if editing => app.commit_edit(),
            KeyCode::Enter => app.submit_new(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.delete_forward(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_todo_confirm(app: &mut TodoApp, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.decline(),
            _ => {}
        }
    }
}
