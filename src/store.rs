use tracing::debug;

use crate::domain::task::{NewTask, Task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed(Task),
    NotFound,
}

/// A task as handed to the view: `(name, priority, due_date)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub name: String,
    pub priority: String,
    pub due_date: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            priority: task.priority.clone(),
            due_date: task.due_date.clone(),
        }
    }
}

/// Ordered in-memory task list. Insertion order is display order and names
/// are not required to be unique.
#[derive(Debug, Default)]
pub struct TaskStore {
    items: Vec<Task>,
}

impl TaskStore {
    pub fn add(&mut self, new: NewTask) -> &Task {
        let task = new.into_task();
        debug!(name = %task.name, due_date = %task.due_date, "task added");
        self.items.push(task);
        &self.items[self.items.len() - 1]
    }

    /// Removes the first task named exactly `name`.
    pub fn remove_by_name(&mut self, name: &str) -> RemovalOutcome {
        match self.items.iter().position(|t| t.name == name) {
            Some(pos) => {
                let task = self.items.remove(pos);
                debug!(name = %task.name, position = pos, "task removed");
                RemovalOutcome::Removed(task)
            }
            None => RemovalOutcome::NotFound,
        }
    }

    pub fn list(&self) -> &[Task] {
        &self.items
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "task list replaced");
        self.items = tasks;
    }

    pub fn rows(&self) -> Vec<TaskRow> {
        self.items.iter().map(TaskRow::from).collect()
    }
}

#[cfg(test)]
impl TaskStore {
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut store = Self::default();
        store.items.extend(tasks);
        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
