use serde::{Deserialize, Serialize};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// `yyyy-mm-dd`, zero padded.
pub const DUE_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// One to-do record. Field names double as the on-disk JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub priority: String,
    pub due_date: String,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        priority: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            priority: priority.into(),
            due_date: due_date.into(),
        }
    }
}

/// A task whose fields passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub(crate) name: String,
    pub(crate) priority: String,
    pub(crate) due_date: Date,
}

impl NewTask {
    pub(crate) fn into_task(self) -> Task {
        let due_date = self
            .due_date
            .format(DUE_DATE_FORMAT)
            .unwrap_or_else(|_| self.due_date.to_string());
        Task {
            name: self.name,
            priority: self.priority,
            due_date,
        }
    }
}

#[cfg(test)]
impl NewTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn due_date(&self) -> Date {
        self.due_date
    }
}

/// Choices offered by the input form. The store keeps priority as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }

    pub fn from_shortcut(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'l' => Some(Priority::Low),
            'm' => Some(Priority::Medium),
            'h' => Some(Priority::High),
            _ => None,
        }
    }
}
