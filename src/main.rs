mod app;
mod domain;
mod logging;
mod repo;
mod store;
mod ui;
mod validate;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use app::{App, Options};
use domain::task::Task;
use repo::TaskRepository;
use repo::json::JsonTaskRepo;
use repo::memory::InMemoryTaskRepo;
use validate::DatePolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "taskman: a small terminal task manager", long_about = None)]
struct Args {
    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Start with demo tasks (nothing is written to disk)
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Keep tasks in memory instead of a JSON file
    #[arg(long, default_value_t = false)]
    memory: bool,

    /// Path to the tasks JSON file (default: OS data dir)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Accept due dates that are today or in the past
    #[arg(long, default_value_t = false)]
    allow_past: bool,

    /// Do not save automatically after deleting a task
    #[arg(long, default_value_t = false)]
    no_autosave: bool,

    /// Log file (default: OS data dir); filter with RUST_LOG
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.clone().or_else(logging::default_log_path) {
        // The UI still works without a log file.
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e:#}");
        }
    }

    let repo: Box<dyn TaskRepository> = if args.demo {
        Box::new(InMemoryTaskRepo::with_seed(seed_tasks()))
    } else if args.memory {
        Box::new(InMemoryTaskRepo::default())
    } else if let Some(path) = args.file.as_ref() {
        Box::new(JsonTaskRepo::open(path))
    } else {
        Box::new(JsonTaskRepo::open_default()?)
    };
    info!(location = %repo.location(), "starting");

    let options = Options {
        date_policy: if args.allow_past {
            DatePolicy::AnyDate
        } else {
            DatePolicy::FutureOnly
        },
        autosave: !args.no_autosave,
    };

    let app = App::new(repo, options);
    ui::run(app, Duration::from_millis(args.tick_ms))
}

fn seed_tasks() -> Vec<Task> {
    vec![
        Task::new("Pay rent", "High", "2030-01-01"),
        Task::new("Water the plants", "Low", "2030-01-03"),
        Task::new("Draft release notes", "Medium", "2030-01-10"),
    ]
}
