//! Task list application state.
//!
//! Owns the [`TodoList`], mirrors it to storage after every change, and
//! tracks the input, selection, confirmation and warning state of the UI.

use crate::domain::{Filter, Todo, TodoError, TodoList};
use crate::infrastructure::{ExportError, KeyValueStore, TODOS_KEY, load_json, save_json};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Delete(u64),
    ClearCompleted,
    ClearAll,
}

/// Represents the current mode of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoMode {
    /// Navigating the list
    Normal,
    /// Typing a new task into the input field
    Adding,
    /// Editing the text of an existing task
    Editing { id: u64 },
    /// Waiting for a yes/no answer
    Confirm(PendingAction),
    /// Help screen is displayed
    Help,
}

pub struct TodoApp {
    /// Current mode
    pub mode: TodoMode,
    /// Which tasks are shown
    pub filter: Filter,
    /// Text of the input field (new task or edit)
    pub input: String,
    /// Cursor position within `input`, in characters
    pub cursor_position: usize,
    /// Index of the highlighted task within the filtered view
    pub selected: usize,
    /// Policy warning shown until the next key press
    pub warning: Option<String>,
    /// Informational status message
    pub status_message: Option<String>,
    list: TodoList,
    store: Box<dyn KeyValueStore>,
    export_path: PathBuf,
}

impl TodoApp {
    /// Creates the application, restoring tasks from `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - Storage the list is loaded from and saved to
    /// * `export_path` - Where `Ctrl+E` writes the CSV export
    pub fn new(store: Box<dyn KeyValueStore>, export_path: PathBuf) -> Self {
        let todos = match load_json::<Vec<Todo>>(&*store, TODOS_KEY) {
            Ok(todos) => todos.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not load tasks");
                Vec::new()
            }
        };
        info!(tasks = todos.len(), "Tasks loaded");

        Self {
            mode: TodoMode::Normal,
            filter: Filter::All,
            input: String::new(),
            cursor_position: 0,
            selected: 0,
            warning: None,
            status_message: None,
            list: TodoList::from_todos(todos),
            store,
            export_path,
        }
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn export_path(&self) -> &PathBuf {
        &self.export_path
    }

    /// Tasks matching the current filter, in display order.
    pub fn visible(&self) -> Vec<&Todo> {
        self.list.filtered(self.filter).collect()
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.visible().get(self.selected).map(|todo| todo.id)
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Clears warnings and status messages left from the previous key.
    pub fn dismiss_messages(&mut self) {
        self.warning = None;
        self.status_message = None;
    }

    pub fn start_adding(&mut self) {
        self.mode = TodoMode::Adding;
        self.set_input(String::new());
    }

    /// Adds the input field's text as a new task.
    ///
    /// Blank input is rejected with a warning and leaves the field as is.
    pub fn submit_new(&mut self) {
        match self.list.add(&self.input, Utc::now()) {
            Ok(todo) => {
                debug!(id = todo.id, "task added");
                self.set_input(String::new());
                self.after_change();
                // Select the new task when it is visible
                let visible = self.visible().len();
                if visible > 0 && self.filter != Filter::Completed {
                    self.selected = visible - 1;
                }
            }
            Err(e) => self.warn(e),
        }
    }

    /// Leaves the input field without adding or editing anything.
    pub fn cancel_input(&mut self) {
        self.mode = TodoMode::Normal;
        self.set_input(String::new());
    }

    pub fn toggle(&mut self, id: u64) {
        if self.list.toggle(id) {
            debug!(id, "task toggled");
            self.after_change();
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.toggle(id);
        }
    }

    /// Starts editing the highlighted task with its text in the input field.
    pub fn start_editing_selected(&mut self) {
        let Some(todo) = self.selected_id().and_then(|id| self.list.get(id)) else {
            return;
        };
        let (id, text) = (todo.id, todo.text.clone());
        self.mode = TodoMode::Editing { id };
        self.set_input(text);
    }

    /// Commits the edit if the text is non-empty and changed; otherwise the
    /// task keeps its previous text.
    pub fn commit_edit(&mut self) {
        let TodoMode::Editing { id } = self.mode else {
            return;
        };
        if self.list.edit(id, &self.input) {
            debug!(id, "task edited");
            self.after_change();
        }
        self.cancel_input();
    }

    /// Asks for confirmation before deleting a task.
    pub fn request_delete(&mut self, id: u64) {
        if self.list.get(id).is_some() {
            self.mode = TodoMode::Confirm(PendingAction::Delete(id));
        }
    }

    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.request_delete(id);
        }
    }

    /// Asks for confirmation before clearing completed tasks, or warns if
    /// there are none.
    pub fn request_clear_completed(&mut self) {
        if self.list.completed_count() == 0 {
            self.warn(TodoError::NoCompletedTasks);
        } else {
            self.mode = TodoMode::Confirm(PendingAction::ClearCompleted);
        }
    }

    /// Asks for confirmation before clearing every task, or warns if the
    /// list is empty.
    pub fn request_clear_all(&mut self) {
        if self.list.is_empty() {
            self.warn(TodoError::NoTasks);
        } else {
            self.mode = TodoMode::Confirm(PendingAction::ClearAll);
        }
    }

    /// Question shown while a confirmation is pending.
    pub fn confirmation_prompt(&self) -> Option<String> {
        let TodoMode::Confirm(action) = self.mode else {
            return None;
        };
        let prompt = match action {
            PendingAction::Delete(_) => "Are you sure you want to delete this task?".to_string(),
            PendingAction::ClearCompleted => {
                format!("Clear {} completed task(s)?", self.list.completed_count())
            }
            PendingAction::ClearAll => format!(
                "Clear all {} task(s)? This cannot be undone.",
                self.list.todos().len()
            ),
        };
        Some(prompt)
    }

    /// Carries out the pending action.
    pub fn confirm(&mut self) {
        let TodoMode::Confirm(action) = self.mode else {
            return;
        };
        self.mode = TodoMode::Normal;

        match action {
            PendingAction::Delete(id) => {
                if self.list.remove(id).is_some() {
                    debug!(id, "task deleted");
                    self.after_change();
                }
            }
            PendingAction::ClearCompleted => match self.list.clear_completed() {
                Ok(removed) => {
                    info!(removed, "completed tasks cleared");
                    self.after_change();
                }
                Err(e) => self.warn(e),
            },
            PendingAction::ClearAll => match self.list.clear_all() {
                Ok(removed) => {
                    info!(removed, "all tasks cleared");
                    self.after_change();
                }
                Err(e) => self.warn(e),
            },
        }
    }

    /// Drops the pending action without changing anything.
    pub fn decline(&mut self) {
        if matches!(self.mode, TodoMode::Confirm(_)) {
            self.mode = TodoMode::Normal;
            self.warning = Some("Cancelled".to_string());
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.selected = 0;
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn toggle_help(&mut self) {
        self.mode = if self.mode == TodoMode::Help {
            TodoMode::Normal
        } else {
            TodoMode::Help
        };
    }

    /// Records the outcome of a CSV export.
    pub fn set_export_result(&mut self, result: Result<usize, ExportError>) {
        match result {
            Ok(rows) => {
                info!(rows, path = %self.export_path.display(), "tasks exported");
                self.status_message = Some(format!(
                    "Exported {} task(s) to {}",
                    rows,
                    self.export_path.display()
                ));
            }
            Err(e) => {
                warn!(error = %e, "Task export failed");
                self.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor_position);
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_offset(self.cursor_position);
            self.input.remove(at);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let at = self.byte_offset(self.cursor_position);
            self.input.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    fn set_input(&mut self, text: String) {
        self.cursor_position = text.chars().count();
        self.input = text;
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map_or(self.input.len(), |(offset, _)| offset)
    }

    fn warn(&mut self, error: TodoError) {
        debug!(%error, "task list warning");
        self.warning = Some(error.to_string());
    }

    fn after_change(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        if let Err(e) = save_json(&mut *self.store, TODOS_KEY, self.list.todos()) {
            warn!(error = %e, "Could not save tasks");
        }
    }
}
