use clap::Parser;
use clap::error::ErrorKind;
use log::debug;
use std::io::IsTerminal;
use tasktracker_cli::cli::{Cli, Command, collect_overrides};
use tasktracker_core::config::{self, Config};
use tasktracker_core::error::AppError;
use tasktracker_core::ledger::Ledger;
use tasktracker_core::model::Task;
use tasktracker_core::report::{self, DayReport};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Current local time truncated to the second, the precision the store keeps.
fn now() -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::now_utc()
        .to_offset(local_offset())
        .replace_nanosecond(0)
        .map_err(|err| AppError::invalid_argument(err.to_string()))
}

fn format_rfc3339(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_argument(err.to_string()))
}

fn parse_since(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_argument("since must be YYYY-MM-DD"))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_argument(message)
}

fn print_task_json(task: &Task, now: OffsetDateTime) -> Result<(), AppError> {
    let end = task.end().map(format_rfc3339).transpose()?;
    let json = serde_json::json!({
        "name": task.name(),
        "start": format_rfc3339(task.start())?,
        "end": end,
        "completed": task.is_completed(),
        "duration": report::format_minutes(task.duration_minutes(now)),
    });
    println!("{}", json);
    Ok(())
}

fn print_report_json(days: &[DayReport]) {
    let payload: Vec<serde_json::Value> = days
        .iter()
        .map(|day| {
            let entries: Vec<serde_json::Value> = day
                .entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "name": entry.name,
                        "minutes": entry.minutes,
                        "duration": report::format_minutes(entry.minutes),
                    })
                })
                .collect();
            serde_json::json!({
                "date": day.date.to_string(),
                "tasks": entries,
                "total_minutes": day.total_minutes,
                "total": report::format_minutes(day.total_minutes),
            })
        })
        .collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn load_config(cli: &Cli) -> Result<(Config, config::ConfigOverrides), AppError> {
    let (base, problem) = config::load_config();
    if let Some(err) = problem {
        eprintln!("WARNING: ignoring config: {}", err);
    }

    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_argument)?;
    Ok((config::merge_overrides(&base, &overrides), overrides))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let (settings, overrides) = load_config(&cli)?;
    let store_path = config::resolve_store_path(cli.file.as_deref(), &overrides, &settings);
    debug!("using store {}", store_path.display());

    let mut ledger = Ledger::load(&store_path)?;
    let now = now()?;

    match cli.command {
        Command::Start { name } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_argument("task name is required")),
            };

            let previous = ledger.current_task().map(|task| task.name().to_string());
            let task = Task::new_open(&name, now)?;
            ledger.add_task(task.clone())?;
            ledger.save()?;

            if cli.json {
                print_task_json(&task, now)?;
            } else {
                if let Some(previous) = previous {
                    println!("Completed task: {}", previous);
                }
                println!("Started task: {}", task.name());
            }
        }
        Command::Complete => {
            let current = ledger.current_task().cloned();
            if !ledger.complete_current_task(now)? {
                eprintln!("No incomplete task.");
                return Ok(());
            }
            ledger.save()?;

            if let Some(mut task) = current {
                task.complete(now)?;
                if cli.json {
                    print_task_json(&task, now)?;
                } else {
                    println!(
                        "Completed task: {} ({})",
                        task.name(),
                        report::format_minutes(task.duration_minutes(now))
                    );
                }
            }
        }
        Command::Report { since } => {
            let tasks = match since.as_deref() {
                Some(raw) => ledger.tasks_from_day(parse_since(raw)?),
                None => ledger.all_tasks(),
            };
            let days = report::build_report(&tasks, now);

            if cli.json {
                print_report_json(&days);
            } else if days.is_empty() {
                println!("No tasks recorded.");
            } else {
                let palette = settings.palette(std::io::stdout().is_terminal());
                print!("{}", report::render_report(&days, &palette)?);
            }
        }
        Command::Status => match ledger.current_task() {
            Some(task) if cli.json => print_task_json(task, now)?,
            Some(task) => println!(
                "Current task: {} (started {}, {} elapsed)",
                task.name(),
                format_rfc3339(task.start())?,
                report::format_minutes(task.duration_minutes(now))
            ),
            None => eprintln!("No incomplete task."),
        },
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
