//! Taskboard CLI - track tasks across To Do, In Progress and Done.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use taskboard_board::{
    BasicTaskService, Board, BoardQuery, ColumnId, DragLocation, DragResult, NewTask, SortBy,
    TaskService, TaskUpdate,
};
use taskboard_core::{format_timestamp, parse_timestamp, Task, TaskFilter, TaskId, TaskRecord, TaskStatus, Time};
use taskboard_stats::{compute_stats_from_records, Clock, FixedClock, StatsSnapshot, SystemClock};
use taskboard_storage::JsonStorage;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Task board with status columns and dashboard statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage directory for task documents
    #[arg(short, long, env = "TASKBOARD_HOME", default_value = ".taskboard", global = true)]
    storage: PathBuf,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Title (3-100 characters)
        #[arg(long)]
        title: Option<String>,
        /// Priority (1-5)
        #[arg(long)]
        priority: Option<u8>,
        /// Start time, ISO-8601 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        start: Option<Time>,
        /// Estimated end time, ISO-8601 (defaults to start + 24h)
        #[arg(long, value_parser = parse_time)]
        end: Option<Time>,
        /// Initial status
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// List tasks
    List {
        /// Filter by status
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        /// Only tasks whose title contains this text
        #[arg(long, default_value = "")]
        search: String,
        /// recent, alphabetical, startTime, endTime or priority
        #[arg(long, default_value = "recent")]
        sort: SortBy,
    },
    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<u8>,
        /// New estimated end time, ISO-8601
        #[arg(long, value_parser = parse_time)]
        end: Option<Time>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Change a task's status
    Move {
        /// Task ID
        id: TaskId,
        /// todo, in-progress or done
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Drag a card from one column position to another column
    Drag {
        /// Source column: todo, inProgress or done
        #[arg(long)]
        from: ColumnId,
        /// Index of the card in the source column as shown by `board`
        #[arg(long)]
        index: usize,
        /// Destination column; omit to drop outside the board
        #[arg(long)]
        to: Option<ColumnId>,
        /// Search term the board was shown with
        #[arg(long, default_value = "")]
        search: String,
        /// Sort mode the board was shown with
        #[arg(long, default_value = "recent")]
        sort: SortBy,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },
    /// Show the board
    Board {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "recent")]
        sort: SortBy,
    },
    /// Show dashboard statistics
    Stats {
        /// Reference time, ISO-8601 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        now: Option<Time>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute statistics over a JSON array of task records
    Import {
        /// File holding the records
        file: PathBuf,
        /// Reference time, ISO-8601 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        now: Option<Time>,
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Import { file, now, json } => import(&file, now, json),
        command => run(command, &cli.storage).await,
    }
}

fn import(file: &Path, now: Option<Time>, json: bool) -> Result<()> {
    let stats = stats_from_file(file, now)?;
    print_stats(&stats, json)
}

/// Statistics over a JSON array of task records; storage is not touched.
fn stats_from_file(file: &Path, now: Option<Time>) -> Result<StatsSnapshot> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let records: Vec<TaskRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;
    let now = now.unwrap_or_else(|| SystemClock.now());

    info!(records = records.len(), "computing statistics from file");
    Ok(compute_stats_from_records(&records, now)?)
}

/// `stats --now` pins the reference time; everything else runs on the wall clock.
fn clock_for(command: &Commands) -> Arc<dyn Clock> {
    match command {
        Commands::Stats { now: Some(now), .. } => Arc::new(FixedClock(*now)),
        _ => Arc::new(SystemClock),
    }
}

async fn run(command: Commands, storage_path: &Path) -> Result<()> {
    let clock = clock_for(&command);

    debug!(storage = %storage_path.display(), "opening storage");
    let storage = JsonStorage::new(storage_path).await?;
    let service = BasicTaskService::new(storage).with_clock(clock);

    match command {
        Commands::Add { title, priority, start, end, status } => {
            let task = service
                .create_task(NewTask { title, priority, start_time: start, end_time: end, status })
                .await?;
            println!("Added task: {} - {}", task.id, task.title);
        }
        Commands::List { status, search, sort } => {
            let filter = TaskFilter {
                status: status.map(|s| vec![s]),
                ..Default::default()
            };
            let query = BoardQuery::search(search);
            let mut tasks: Vec<Task> = service
                .list_tasks(&filter)
                .await?
                .into_iter()
                .filter(|t| query.matches(t))
                .collect();
            sort.sort(&mut tasks);

            println!("Tasks ({})", tasks.len());
            for task in tasks {
                println!("  {} | {} | {} | {}",
                    task.id,
                    format_status(task.status),
                    stars(task.priority),
                    task.title,
                );
            }
        }
        Commands::Show { id } => {
            let task = service.get_task(id).await?;
            print_task(&task);
        }
        Commands::Edit { id, title, priority, end, status } => {
            let task = service
                .update_task(id, TaskUpdate { title, priority, end_time: end, status, ..Default::default() })
                .await?;
            println!("Updated task: {} - {}", task.id, task.title);
        }
        Commands::Move { id, status } => {
            let task = service.move_task(id, status).await?;
            println!("{} is now {}", task.title, format_status(task.status));
        }
        Commands::Drag { from, index, to, search, sort } => {
            let drag = DragResult {
                source: DragLocation::new(from, index),
                destination: to.map(|column| DragLocation::new(column, 0)),
            };
            let query = BoardQuery::search(search).sorted_by(sort);
            match service.drop_task(&drag, &query).await? {
                Some(task) => println!("{} is now {}", task.title, format_status(task.status)),
                None => println!("Nothing moved"),
            }
        }
        Commands::Delete { id } => {
            service.delete_task(id).await?;
            println!("Deleted task: {}", id);
        }
        Commands::Board { search, sort } => {
            let board = service.board(&BoardQuery::search(search).sorted_by(sort)).await?;
            print_board(&board);
        }
        Commands::Stats { json, .. } => {
            let stats = service.stats().await?;
            print_stats(&stats, json)?;
        }
        Commands::Import { file, now, json } => import(&file, now, json)?,
    }

    Ok(())
}

fn parse_time(s: &str) -> Result<Time, String> {
    parse_timestamp(s).ok_or_else(|| format!("invalid timestamp: {}", s))
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "todo" => Ok(TaskStatus::ToDo),
        "inprogress" => Ok(TaskStatus::InProgress),
        "done" => Ok(TaskStatus::Done),
        _ => Err(format!("unknown status: {} (expected todo, in-progress or done)", s)),
    }
}

fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::ToDo => "TO DO",
        TaskStatus::InProgress => "IN PROGRESS",
        TaskStatus::Done => "DONE",
    }
}

fn stars(priority: u8) -> String {
    (1..=5).map(|star| if star <= priority { '★' } else { '☆' }).collect()
}

fn print_task(task: &Task) {
    println!("Task: {}", task.id);
    println!("  Title: {}", task.title);
    println!("  Status: {}", format_status(task.status));
    println!("  Priority: {}", stars(task.priority));
    println!("  Start: {}", format_timestamp(task.start_time));
    match task.actual_end_time {
        Some(actual) => {
            println!("  Completed: {}", format_timestamp(actual));
            println!("  Original Estimated End: {}", format_timestamp(task.end_time));
        }
        None => println!("  Expected End: {}", format_timestamp(task.end_time)),
    }
}

fn print_board(board: &Board) {
    for column in &board.columns {
        println!("{} ({})", column.title, column.tasks.len());
        for (index, task) in column.tasks.iter().enumerate() {
            println!("  [{}] {} {} - {}", index, stars(task.priority), task.title, task.id);
        }
    }
}

fn print_stats(stats: &StatsSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    let percent = |status| match stats.status_distribution.percent(status) {
        Some(p) => format!("{:.1}%", p),
        None => "-".to_string(),
    };
    let metrics = &stats.in_progress_metrics;

    println!("Task Dashboard ({})", format_timestamp(stats.as_of));
    println!("  Total Tasks: {}", stats.total_tasks);
    println!("  Status Distribution:");
    for status in TaskStatus::ALL {
        println!("    {}: {} ({})",
            status,
            percent(status),
            stats.status_distribution.count(status),
        );
    }
    println!("  In Progress Metrics ({} tasks):", metrics.task_count);
    println!("    Avg Lapsed Time: {:.1} hrs", metrics.average_lapsed_time);
    println!("    Avg Balance Time: {:.1} hrs", metrics.average_balance_time);
    println!("  Average Completion Time: {:.1} hrs", stats.average_completion_time);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status_spellings() {
        for raw in ["todo", "To Do", "to-do"] {
            assert_eq!(parse_status(raw), Ok(TaskStatus::ToDo));
        }
        assert_eq!(parse_status("In Progress"), Ok(TaskStatus::InProgress));
        assert_eq!(parse_status("in_progress"), Ok(TaskStatus::InProgress));
        assert_eq!(parse_status("DONE"), Ok(TaskStatus::Done));
        assert!(parse_status("finished").is_err());
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
    }

    fn at(raw: &str) -> Time {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_stats_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.json");
        std::fs::write(&file, r#"[
            {"_id":"65f1c2a9e4b0a1b2c3d4e5f6","title":"Migrate users","priority":2,
             "status":"In Progress","startTime":"2024-06-10T10:00:00.000Z",
             "endTime":"2024-06-10T15:00:00.000Z","__v":0},
            {"_id":"65f1c2a9e4b0a1b2c3d4e5f7","title":"Release notes","priority":3,
             "status":"Done","startTime":"2024-06-09T08:00:00.000Z",
             "endTime":"2024-06-09T12:00:00.000Z",
             "actualEndTime":"2024-06-09T14:00:00.000Z","__v":0}
        ]"#).unwrap();

        let stats = stats_from_file(&file, Some(at("2024-06-10T12:00:00Z"))).unwrap();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.status_distribution.in_progress_percent, Some(50.0));
        assert_eq!(stats.status_distribution.done_percent, Some(50.0));
        assert_eq!(stats.in_progress_metrics.average_lapsed_time, 2.0);
        assert_eq!(stats.in_progress_metrics.average_balance_time, 3.0);
        assert_eq!(stats.average_completion_time, 6.0);
        assert_eq!(stats.as_of, at("2024-06-10T12:00:00Z"));
    }

    #[test]
    fn test_stats_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(stats_from_file(&dir.path().join("missing.json"), None).is_err());

        let file = dir.path().join("tasks.json");
        std::fs::write(&file, r#"[{"_id":"x","title":"Broken","priority":1,
            "status":"To Do","startTime":"whenever","endTime":"2024-06-10"}]"#).unwrap();
        let err = stats_from_file(&file, None).unwrap_err();
        assert!(err.to_string().contains("malformed task record"));

        std::fs::write(&file, "not json").unwrap();
        assert!(stats_from_file(&file, None).is_err());
    }

    #[test]
    fn test_stats_now_pins_clock() {
        let cli = Cli::try_parse_from(["taskboard", "stats", "--now", "2024-06-10T12:00:00Z"])
            .unwrap();
        assert_eq!(clock_for(&cli.command).now(), at("2024-06-10T12:00:00Z"));

        let cli = Cli::try_parse_from(["taskboard", "stats", "--now", "2024-06-10"]).unwrap();
        assert_eq!(clock_for(&cli.command).now(), at("2024-06-10T00:00:00Z"));

        assert!(Cli::try_parse_from(["taskboard", "stats", "--now", "later"]).is_err());
    }

    #[test]
    fn test_parse_drag_command() {
        let cli = Cli::try_parse_from([
            "taskboard", "drag", "--from", "inProgress", "--index", "2", "--to", "done",
        ])
        .unwrap();
        match cli.command {
            Commands::Drag { from, index, to, .. } => {
                assert_eq!(from, ColumnId::InProgress);
                assert_eq!(index, 2);
                assert_eq!(to, Some(ColumnId::Done));
            }
            _ => panic!("expected drag"),
        }
    }
}
