use time::Date;
use tracing::warn;

use crate::domain::task::Priority;
use crate::repo::{LoadError, TaskRepository};
use crate::store::{RemovalOutcome, TaskRow, TaskStore};
use crate::validate::{self, DatePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Priority,
    DueDate,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Priority,
            FormField::Priority => FormField::DueDate,
            FormField::DueDate => FormField::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Name => FormField::DueDate,
            FormField::Priority => FormField::Name,
            FormField::DueDate => FormField::Priority,
        }
    }
}

/// Values typed into the add-task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub name: String,
    pub priority: Option<Priority>,
    pub due_date: String,
    pub focus: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            priority: None,
            due_date: String::new(),
            focus: FormField::Name,
        }
    }
}

impl TaskForm {
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            FormField::Name => self.name.push(c),
            FormField::DueDate => self.due_date.push(c),
            FormField::Priority => {
                if let Some(p) = Priority::from_shortcut(c) {
                    self.priority = Some(p);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            FormField::Name => {
                self.name.pop();
            }
            FormField::DueDate => {
                self.due_date.pop();
            }
            FormField::Priority => self.priority = None,
        }
    }

    pub fn cycle_priority(&mut self, forward: bool) {
        self.priority = Some(match (self.priority, forward) {
            (None, true) => Priority::Low,
            (None, false) => Priority::High,
            (Some(p), true) => p.next(),
            (Some(p), false) => p.previous(),
        });
    }

    fn priority_text(&self) -> &'static str {
        self.priority.map(Priority::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

/// Terminal state of the last storage operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    Idle,
    Loaded,
    LoadFailed,
    Saved,
    SaveFailed,
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub date_policy: DatePolicy,
    pub autosave: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            date_policy: DatePolicy::FutureOnly,
            autosave: true,
        }
    }
}

pub struct App<R: TaskRepository> {
    repo: R,
    store: TaskStore,
    options: Options,
    today: fn() -> Date,
    /// Set when the file on disk could not be parsed; the next save asks
    /// for confirmation instead of overwriting it.
    overwrite_guard: bool,
    pub rows: Vec<TaskRow>,
    pub selected: usize,
    pub mode: InputMode,
    pub form: TaskForm,
    pub status: Option<Status>,
    pub persist: PersistState,
    pub dirty: bool,
}

impl<R: TaskRepository> App<R> {
    pub fn new(repo: R, options: Options) -> Self {
        let mut app = Self {
            repo,
            store: TaskStore::default(),
            options,
            today: validate::today,
            overwrite_guard: false,
            rows: Vec::new(),
            selected: 0,
            mode: InputMode::Normal,
            form: TaskForm::default(),
            status: None,
            persist: PersistState::Idle,
            dirty: false,
        };
        app.reload();
        app
    }

    pub fn location(&self) -> String {
        self.repo.location()
    }

    /// Re-projects the store for the view. Called after every mutation.
    fn sync_view(&mut self) {
        self.rows = self.store.rows();
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    /// Replaces the store with what the repository holds. On failure the
    /// current list is kept untouched.
    pub fn reload(&mut self) {
        match self.repo.load() {
            Ok(report) => {
                let count = report.tasks.len();
                self.store.replace_all(report.tasks);
                self.dirty = false;
                self.overwrite_guard = false;
                self.persist = PersistState::Loaded;
                self.sync_view();
                if report.skipped > 0 {
                    self.set_status(
                        StatusLevel::Warning,
                        format!(
                            "Loaded {count} tasks, skipped {} incomplete",
                            report.skipped
                        ),
                    );
                } else {
                    self.set_status(StatusLevel::Info, format!("Loaded {count} tasks"));
                }
            }
            Err(e) => {
                warn!(error = %e, "load failed, keeping current tasks");
                self.persist = PersistState::LoadFailed;
                let message = match e {
                    LoadError::Io { .. } => format!("Error loading tasks: {e}"),
                    LoadError::Parse { .. } | LoadError::NotAnArray { .. } => {
                        self.overwrite_guard = true;
                        format!("Error loading tasks: {e} (kept current list)")
                    }
                };
                self.set_status(StatusLevel::Error, message);
            }
        }
    }

    pub fn save(&mut self) -> bool {
        if self.overwrite_guard {
            self.overwrite_guard = false;
            self.set_status(
                StatusLevel::Warning,
                format!(
                    "{} could not be parsed; save again to overwrite it",
                    self.repo.location()
                ),
            );
            return false;
        }
        match self.repo.save(self.store.list()) {
            Ok(()) => {
                self.dirty = false;
                self.persist = PersistState::Saved;
                self.set_status(StatusLevel::Info, "Tasks saved successfully");
                true
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.persist = PersistState::SaveFailed;
                self.set_status(StatusLevel::Error, format!("Error saving tasks: {e}"));
                false
            }
        }
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1).min(self.rows.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn start_editing(&mut self) {
        self.mode = InputMode::Editing;
        self.form = TaskForm::default();
        self.set_status(StatusLevel::Info, "Fill in the task and press Enter");
    }

    pub fn cancel_editing(&mut self) {
        self.mode = InputMode::Normal;
        self.form = TaskForm::default();
        self.set_status(StatusLevel::Info, "Canceled");
    }

    /// Validates the form and appends the task. On a validation failure the
    /// form stays open and the store is not touched.
    pub fn add_task(&mut self) {
        let today = (self.today)();
        let validated = validate::validate_fields(
            &self.form.name,
            self.form.priority_text(),
            &self.form.due_date,
            self.options.date_policy,
            today,
        );
        let new = match validated {
            Ok(new) => new,
            Err(e) => {
                self.set_status(StatusLevel::Warning, e.to_string());
                return;
            }
        };

        let name = self.store.add(new).name.clone();
        self.dirty = true;
        self.form = TaskForm::default();
        self.mode = InputMode::Normal;
        self.sync_view();
        self.selected = self.rows.len().saturating_sub(1);
        self.set_status(StatusLevel::Info, format!("Added \"{name}\""));
    }

    /// Removes the first task carrying the selected row's name, then saves
    /// when autosave is on.
    pub fn delete_selected(&mut self) {
        let Some(name) = self.rows.get(self.selected).map(|r| r.name.clone()) else {
            return;
        };
        match self.store.remove_by_name(&name) {
            RemovalOutcome::Removed(_) => {
                self.dirty = true;
                self.sync_view();
                if self.options.autosave {
                    if self.save() {
                        self.set_status(StatusLevel::Info, format!("Deleted \"{name}\""));
                    }
                } else {
                    self.set_status(StatusLevel::Info, format!("Deleted \"{name}\""));
                }
            }
            RemovalOutcome::NotFound => {
                self.sync_view();
                self.set_status(StatusLevel::Warning, format!("\"{name}\" is already gone"));
            }
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some(Status {
            level,
            message: message.into(),
        });
    }

    #[cfg(test)]
    fn with_clock(mut self, today: fn() -> Date) -> Self {
        self.today = today;
        self
    }

    #[cfg(test)]
    fn repo(&self) -> &R {
        &self.repo
    }
}
