use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use super::{LoadError, LoadReport, SaveError, TaskRepository};
use crate::domain::task::Task;

pub const DEFAULT_FILE_NAME: &str = "tasks.json";

/// Tasks stored as a JSON array in a single file.
pub struct JsonTaskRepo {
    path: PathBuf,
}

impl JsonTaskRepo {
    pub fn open_default() -> Result<Self> {
        let path = default_tasks_path()?;
        Ok(Self::open(path))
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl TaskRepository for JsonTaskRepo {
    fn load(&mut self) -> Result<LoadReport, LoadError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no task file yet, starting empty");
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let report = parse_task_file(&raw).map_err(|e| match e {
            ParseFailure::Json(source) => LoadError::Parse {
                path: self.path.clone(),
                source,
            },
            ParseFailure::NotAnArray => LoadError::NotAnArray {
                path: self.path.clone(),
            },
        })?;
        info!(
            path = %self.path.display(),
            loaded = report.tasks.len(),
            skipped = report.skipped,
            "loaded tasks"
        );
        Ok(report)
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), SaveError> {
        let bytes = serde_json::to_vec_pretty(tasks)?;
        self.write_atomically(&bytes).map_err(|source| SaveError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
impl JsonTaskRepo {
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[derive(Debug)]
enum ParseFailure {
    Json(serde_json::Error),
    NotAnArray,
}

/// Decodes the file body, keeping well-formed records in file order.
fn parse_task_file(raw: &[u8]) -> Result<LoadReport, ParseFailure> {
    let value: Value = serde_json::from_slice(raw).map_err(ParseFailure::Json)?;
    let Value::Array(records) = value else {
        return Err(ParseFailure::NotAnArray);
    };

    let mut report = LoadReport::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Task>(record.clone()) {
            Ok(task) => report.tasks.push(task),
            Err(e) => {
                warn!(index, record = %record, error = %e, "skipping incomplete task");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

fn default_tasks_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("failed to resolve data dir")?;
    Ok(base.join("taskman").join(DEFAULT_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_in(dir: &tempfile::TempDir) -> JsonTaskRepo {
        JsonTaskRepo::open(dir.path().join(DEFAULT_FILE_NAME))
    }

    #[test]
    fn json_repo_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = repo_in(&dir);
        let tasks = vec![
            Task::new("Pay rent", "High", "2030-01-01"),
            Task::new("Water plants", "Low", "2030-02-01"),
            Task::new("Pay rent", "Medium", "2030-03-01"),
        ];

        repo.save(&tasks).unwrap();
        let report = JsonTaskRepo::open(repo.path()).load().unwrap();

        assert_eq!(report.tasks, tasks);
        assert_eq!(report.skipped, 0);
        assert!(!repo.tmp_path().exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = repo_in(&dir).load().unwrap();
        assert!(report.tasks.is_empty());
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn incomplete_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = repo_in(&dir);
        fs::write(
            repo.path(),
            r#"[
                {"name": "Pay rent", "priority": "High", "due_date": "2030-01-01"},
                {"name": "No date", "priority": "Low"},
                {"name": 7, "priority": "Low", "due_date": "2030-01-01"},
                "not even an object"
            ]"#,
        )
        .unwrap();

        let report = repo.load().unwrap();
        assert_eq!(report.tasks, [Task::new("Pay rent", "High", "2030-01-01")]);
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn loaded_records_are_not_revalidated() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = repo_in(&dir);
        fs::write(
            repo.path(),
            r#"[{"name": "Old", "priority": "Whenever", "due_date": "1999-12-31", "note": "x"}]"#,
        )
        .unwrap();

        let report = repo.load().unwrap();
        assert_eq!(report.tasks, [Task::new("Old", "Whenever", "1999-12-31")]);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = repo_in(&dir);

        fs::write(repo.path(), "[{\"name\": ").unwrap();
        assert!(matches!(repo.load(), Err(LoadError::Parse { .. })));

        fs::write(repo.path(), r#"{"name": "a"}"#).unwrap();
        assert!(matches!(repo.load(), Err(LoadError::NotAnArray { .. })));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = repo_in(&dir);
        fs::write(
            repo.path(),
            b"[{\"name\": \"\xff\xfe\", \"priority\": \"Low\", \"due_date\": \"2030-01-01\"}]",
        )
        .unwrap();
        assert!(matches!(repo.load(), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonTaskRepo::open(dir.path().join("nested/deeper/tasks.json"));
        repo.save(&[Task::new("a", "Low", "2030-01-01")]).unwrap();
        assert_eq!(repo.load().unwrap().tasks.len(), 1);
    }

    #[test]
    fn save_into_a_file_path_fails_with_io_error() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let mut repo = JsonTaskRepo::open(blocker.path().join("tasks.json"));
        let err = repo.save(&[]).unwrap_err();
        assert!(matches!(err, SaveError::Io { .. }));
    }
}
