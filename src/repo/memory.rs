use super::{LoadError, LoadReport, SaveError, TaskRepository};
use crate::domain::task::Task;

/// Keeps the "saved" copy in memory. Used by `--memory`/`--demo` and tests.
#[derive(Default)]
pub struct InMemoryTaskRepo {
    saved: Vec<Task>,
    fail_saves: bool,
}

impl InMemoryTaskRepo {
    pub fn with_seed(seed: impl IntoIterator<Item = Task>) -> Self {
        let mut repo = Self::default();
        repo.saved.extend(seed);
        repo
    }
}

#[cfg(test)]
impl InMemoryTaskRepo {
    /// Every subsequent save is rejected.
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn saved(&self) -> &[Task] {
        &self.saved
    }
}

impl TaskRepository for InMemoryTaskRepo {
    fn load(&mut self) -> Result<LoadReport, LoadError> {
        Ok(LoadReport {
            tasks: self.saved.clone(),
            skipped: 0,
        })
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), SaveError> {
        if self.fail_saves {
            return Err(SaveError::Rejected("in-memory store is read-only".into()));
        }
        self.saved = tasks.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
