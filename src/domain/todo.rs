//! Task list model.

use super::errors::TodoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Which tasks are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    /// The filter after this one when cycling through them.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Pending => "Pending",
            Filter::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Ordered list of tasks plus the id counter.
///
/// Insertion order is display order. Ids are handed out from `next_id`,
/// which only goes back to 1 through [`TodoList::clear_all`].
#[derive(Debug, Clone)]
pub struct TodoList {
    todos: Vec<Todo>,
    next_id: u64,
}

impl Default for TodoList {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }
}

impl TodoList {
    /// Rebuilds a list from stored tasks, continuing after the highest id.
    pub fn from_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos
            .iter()
            .map(|todo| todo.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self { todos, next_id }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Appends a new pending task with the next id.
    ///
    /// # Errors
    ///
    /// [`TodoError::EmptyText`] when `text` is empty or only whitespace,
    /// [`TodoError::IdsExhausted`] once `u64::MAX` has been handed out.
    pub fn add(&mut self, text: &str, created_at: DateTime<Utc>) -> Result<&Todo, TodoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }

        let id = self.next_id;
        if self.get(id).is_some() {
            return Err(TodoError::IdsExhausted);
        }
        self.next_id = id.saturating_add(1);
        self.todos.push(Todo {
            id,
            text: text.to_string(),
            completed: false,
            created_at,
        });
        Ok(&self.todos[self.todos.len() - 1])
    }

    /// Flips the completion flag. Returns `false` if no task has `id`.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => false,
        }
    }

    /// Replaces the text of a task.
    ///
    /// Returns `true` only when the change was applied: the task exists and
    /// the trimmed text is non-empty and different from the current text.
    pub fn edit(&mut self, id: u64, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return false;
        }
        match self.todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) if todo.text != new_text => {
                todo.text = new_text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<Todo> {
        let index = self.todos.iter().position(|todo| todo.id == id)?;
        Some(self.todos.remove(index))
    }

    /// Removes every completed task and returns how many were removed.
    ///
    /// # Errors
    ///
    /// [`TodoError::NoCompletedTasks`] when nothing is completed.
    pub fn clear_completed(&mut self) -> Result<usize, TodoError> {
        let before = self.todos.len();
        self.todos.retain(|todo| !todo.completed);
        match before - self.todos.len() {
            0 => Err(TodoError::NoCompletedTasks),
            removed => Ok(removed),
        }
    }

    /// Removes every task and restarts ids at 1.
    ///
    /// # Errors
    ///
    /// [`TodoError::NoTasks`] when the list is already empty.
    pub fn clear_all(&mut self) -> Result<usize, TodoError> {
        if self.todos.is_empty() {
            return Err(TodoError::NoTasks);
        }
        let removed = self.todos.len();
        self.todos.clear();
        self.next_id = 1;
        Ok(removed)
    }

    pub fn filtered(&self, filter: Filter) -> impl Iterator<Item = &Todo> {
        self.todos.iter().filter(move |todo| filter.matches(todo))
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    pub fn counts(&self) -> TaskCounts {
        let total = self.todos.len();
        let completed = self.completed_count();
        TaskCounts {
            total,
            completed,
            pending: total - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(texts: &[&str]) -> TodoList {
        let mut list = TodoList::default();
        for text in texts {
            list.add(text, Utc::now()).unwrap();
        }
        list
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut list = TodoList::default();
        assert_eq!(list.add("", Utc::now()).unwrap_err(), TodoError::EmptyText);
        assert_eq!(list.add("   ", Utc::now()).unwrap_err(), TodoError::EmptyText);
        assert!(list.is_empty());
        assert_eq!(list.next_id(), 1);
    }

    #[test]
    fn test_add_appends_pending_task() {
        let mut list = TodoList::default();
        let todo = list.add("  buy milk ", Utc::now()).unwrap();
        assert_eq!(todo.id, 1);
        assert_eq!(todo.text, "buy milk");
        assert!(!todo.completed);

        let second = list.add("walk dog", Utc::now()).unwrap().id;
        assert_eq!(second, 2);
        assert_eq!(list.todos().len(), 2);
        assert_eq!(list.todos()[0].text, "buy milk");
    }

    #[test]
    fn test_toggle() {
        let mut list = list_with(&["a"]);
        assert!(list.toggle(1));
        assert!(list.get(1).unwrap().completed);
        assert!(list.toggle(1));
        assert!(!list.get(1).unwrap().completed);
        assert!(!list.toggle(99));
    }

    #[test]
    fn test_edit_only_commits_real_changes() {
        let mut list = list_with(&["write report"]);
        assert!(!list.edit(1, "   "));
        assert!(!list.edit(1, "write report"));
        assert!(!list.edit(1, " write report  "));
        assert!(!list.edit(42, "other"));
        assert!(list.edit(1, " write summary "));
        assert_eq!(list.get(1).unwrap().text, "write summary");
    }

    #[test]
    fn test_remove_keeps_id_counter() {
        let mut list = list_with(&["a", "b"]);
        assert_eq!(list.remove(1).map(|todo| todo.text), Some("a".to_string()));
        assert_eq!(list.remove(2).map(|todo| todo.text), Some("b".to_string()));
        assert!(list.remove(2).is_none());
        assert!(list.is_empty());

        assert_eq!(list.add("c", Utc::now()).unwrap().id, 3);
    }

    #[test]
    fn test_clear_all_resets_id_counter() {
        let mut list = list_with(&["a", "b", "c"]);
        assert_eq!(list.clear_all(), Ok(3));
        assert!(list.is_empty());
        assert_eq!(list.clear_all(), Err(TodoError::NoTasks));
        assert_eq!(list.add("d", Utc::now()).unwrap().id, 1);
    }

    #[test]
    fn test_clear_completed() {
        let mut list = list_with(&["a", "b", "c"]);
        assert_eq!(list.clear_completed(), Err(TodoError::NoCompletedTasks));

        list.toggle(1);
        list.toggle(3);
        assert_eq!(list.clear_completed(), Ok(2));
        assert_eq!(list.todos().len(), 1);
        assert_eq!(list.todos()[0].text, "b");
        assert_eq!(list.next_id(), 4);
    }

    #[test]
    fn test_filters_partition_without_mutating() {
        let mut list = list_with(&["a", "b", "c", "d"]);
        list.toggle(2);
        list.toggle(4);
        let before = list.todos().to_vec();

        let pending: Vec<u64> = list.filtered(Filter::Pending).map(|t| t.id).collect();
        let completed: Vec<u64> = list.filtered(Filter::Completed).map(|t| t.id).collect();
        let all: Vec<u64> = list.filtered(Filter::All).map(|t| t.id).collect();

        assert_eq!(pending, vec![1, 3]);
        assert_eq!(completed, vec![2, 4]);
        assert_eq!(all, vec![1, 2, 3, 4]);
        assert_eq!(pending.len() + completed.len(), all.len());
        assert_eq!(list.todos(), before.as_slice());
    }

    #[test]
    fn test_counts() {
        let mut list = list_with(&["a", "b", "c"]);
        list.toggle(2);
        assert_eq!(
            list.counts(),
            TaskCounts {
                total: 3,
                completed: 1,
                pending: 2
            }
        );
    }

    #[test]
    fn test_from_todos_continues_ids() {
        let list = list_with(&["a", "b", "c"]);
        let mut todos = list.todos().to_vec();
        todos.remove(1);
        let restored = TodoList::from_todos(todos);
        assert_eq!(restored.next_id(), 4);
        assert_eq!(TodoList::from_todos(Vec::new()).next_id(), 1);
    }

    #[test]
    fn test_ids_stop_at_u64_max() {
        let mut list = list_with(&["a"]);
        let mut todos = list.todos().to_vec();
        todos[0].id = u64::MAX - 1;
        list = TodoList::from_todos(todos);
        assert_eq!(list.next_id(), u64::MAX);

        assert_eq!(list.add("last", Utc::now()).unwrap().id, u64::MAX);
        assert_eq!(list.add("one more", Utc::now()), Err(TodoError::IdsExhausted));
        assert_eq!(list.todos().len(), 2);

        list.clear_all().unwrap();
        assert_eq!(list.add("fresh", Utc::now()).unwrap().id, 1);
    }

    #[test]
    fn test_filter_cycle() {
        assert_eq!(Filter::All.next(), Filter::Pending);
        assert_eq!(Filter::Pending.next(), Filter::Completed);
        assert_eq!(Filter::Completed.next(), Filter::All);
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let list = list_with(&["a"]);
        let json = serde_json::to_value(&list.todos()[0]).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["completed"], false);

        let stored = r#"{"id":7,"text":"from browser","completed":true,"createdAt":"2024-03-01T10:15:00.000Z"}"#;
        let todo: Todo = serde_json::from_str(stored).unwrap();
        assert_eq!(todo.id, 7);
        assert!(todo.completed);
    }
}
