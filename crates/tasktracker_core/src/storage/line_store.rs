//! Line-oriented record store.
//!
//! One task per line, fields separated by `;`:
//!
//! ```text
//! <start>;<name>;[<end>;]
//! ```
//!
//! Timestamps use `yyyy.MM.dd HHmmssZ`, e.g. `2024.03.01 143000-0500`. A
//! missing end field marks the task as still open. Blank lines are skipped.

use crate::error::AppError;
use crate::model::Task;
use log::debug;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const DEFAULT_STORE_FILE: &str = "tasktracker.data";
const FIELD_SEPARATOR: char = ';';

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year].[month].[day] [hour][minute][second][offset_hour sign:mandatory][offset_minute]"
);

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(TIMESTAMP_FORMAT)
        .map_err(|err| AppError::invalid_argument(format!("cannot format timestamp: {err}")))
}

pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw.trim(), TIMESTAMP_FORMAT).map_err(|err| {
        AppError::invalid_argument(format!("invalid timestamp '{}': {err}", raw.trim()))
    })
}

pub fn encode_task(task: &Task) -> Result<String, AppError> {
    let mut line = format_timestamp(task.start())?;
    line.push(FIELD_SEPARATOR);
    line.push_str(task.name());
    line.push(FIELD_SEPARATOR);

    if let Some(end) = task.end() {
        line.push_str(&format_timestamp(end)?);
        line.push(FIELD_SEPARATOR);
    }

    Ok(line)
}

pub fn decode_task(line: &str) -> Result<Task, AppError> {
    let mut fields = line.split(FIELD_SEPARATOR);

    let start = match fields.next() {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(raw)?,
        _ => return Err(AppError::invalid_argument("missing start timestamp")),
    };
    let name = fields
        .next()
        .ok_or_else(|| AppError::invalid_argument("missing task name"))?;
    let end = match fields.next() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_timestamp(raw)?),
        _ => None,
    };

    if fields.any(|extra| !extra.trim().is_empty()) {
        return Err(AppError::invalid_argument("unexpected trailing fields"));
    }

    match end {
        Some(end) => Task::new_closed(name, start, end),
        None => Task::new_open(name, start),
    }
}

/// Read every record from `path`. A missing store is created empty.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            create_empty_store(path)?;
            debug!("created empty store at {}", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };

    let mut tasks = Vec::new();
    for (index, raw) in content.split(|byte| *byte == b'\n').enumerate() {
        let corrupt = |reason: &str, shown: &str| {
            AppError::corrupt_store(format!(
                "{} line {}: {} ({})",
                path.display(),
                index + 1,
                reason,
                shown
            ))
        };

        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = std::str::from_utf8(raw)
            .map_err(|err| corrupt(&err.to_string(), &String::from_utf8_lossy(raw)))?;
        if line.trim().is_empty() {
            continue;
        }

        let task = decode_task(line).map_err(|err| corrupt(err.message(), line))?;
        tasks.push(task);
    }

    debug!("loaded {} records from {}", tasks.len(), path.display());
    Ok(tasks)
}

/// Rewrite the whole store. Records are written to a temporary file next to
/// the store and renamed over it, so a failed write leaves the old store.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    let mut content = String::new();
    for task in tasks {
        content.push_str(&encode_task(task)?);
        content.push('\n');
    }

    let dir = store_dir(path);
    std::fs::create_dir_all(dir).map_err(|err| AppError::io(format!("{}: {}", dir.display(), err)))?;

    let mut file =
        NamedTempFile::new_in(dir).map_err(|err| AppError::io(format!("{}: {}", dir.display(), err)))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|err| AppError::io(err.to_string()))?;
    file.persist(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err.error)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!("saved {} records to {}", tasks.len(), path.display());
    Ok(())
}

fn create_empty_store(path: &Path) -> Result<(), AppError> {
    let dir = store_dir(path);
    std::fs::create_dir_all(dir).map_err(|err| AppError::io(format!("{}: {}", dir.display(), err)))?;
    std::fs::File::create(path).map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    Ok(())
}

fn store_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
