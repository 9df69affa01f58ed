use std::path::PathBuf;

use thiserror::Error;

use crate::domain::task::Task;

pub mod json;
pub mod memory;

/// Result of a successful load. `skipped` counts records dropped for missing
/// or mistyped fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub tasks: Vec<Task>,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid task file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a valid task file: expected a JSON array")]
    NotAnArray { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode tasks: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}

pub trait TaskRepository {
    /// Reads every stored task in order. A missing store is empty, not an error.
    fn load(&mut self) -> Result<LoadReport, LoadError>;
    fn save(&mut self, tasks: &[Task]) -> Result<(), SaveError>;
    fn location(&self) -> String;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn load(&mut self) -> Result<LoadReport, LoadError> {
        (**self).load()
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), SaveError> {
        (**self).save(tasks)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
