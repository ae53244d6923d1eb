use crate::error::AppError;
use crate::model::Task;
use crate::storage::line_store;
use log::{debug, info};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone)]
struct Record {
    seq: u64,
    task: Task,
}

/// Records sort by start time; equal starts keep insertion order.
fn record_order(left: &Record, right: &Record) -> Ordering {
    left.task
        .start()
        .cmp(&right.task.start())
        .then(left.seq.cmp(&right.seq))
}

/// The ordered collection of tasks bound to its backing store.
///
/// At most one task is open at any time and it is always the chronologically
/// last record. Mutations stay in memory until [`Ledger::save`] is called.
#[derive(Debug)]
pub struct Ledger {
    records: Vec<Record>,
    next_seq: u64,
    backing_path: PathBuf,
}

impl Ledger {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let tasks = line_store::load_tasks(path)?;
        let mut records: Vec<Record> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| Record {
                seq: index as u64,
                task,
            })
            .collect();
        records.sort_by(record_order);

        let last_index = records.len().saturating_sub(1);
        if let Some(position) = records
            .iter()
            .position(|record| !record.task.is_completed())
            && position != last_index
        {
            return Err(AppError::corrupt_store(format!(
                "{}: open task '{}' is not the latest record",
                path.display(),
                records[position].task.name()
            )));
        }

        Ok(Self {
            next_seq: records.len() as u64,
            records,
            backing_path: path.to_path_buf(),
        })
    }

    pub fn backing_path(&self) -> &Path {
        &self.backing_path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert `task`, first closing the open task (if any) at `task.start()`.
    pub fn add_task(&mut self, task: Task) -> Result<(), AppError> {
        if !task.is_completed()
            && let Some(last) = self.records.last()
            && task.start() < last.task.start()
        {
            return Err(AppError::invalid_argument(format!(
                "open task '{}' cannot start before the latest task '{}'",
                task.name(),
                last.task.name()
            )));
        }

        if self.complete_current_task(task.start())? {
            info!("auto-completed previous task at start of '{}'", task.name());
        }

        let record = Record {
            seq: self.next_seq,
            task,
        };
        self.next_seq += 1;

        let index = self
            .records
            .partition_point(|existing| record_order(existing, &record) != Ordering::Greater);
        debug!("inserting '{}' at position {}", record.task.name(), index);
        self.records.insert(index, record);

        Ok(())
    }

    /// Complete the open task at `at`. Returns `false` without touching any
    /// record when there is nothing open.
    pub fn complete_current_task(&mut self, at: OffsetDateTime) -> Result<bool, AppError> {
        match self.records.last_mut() {
            Some(record) if !record.task.is_completed() => {
                record.task.complete(at)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.records
            .last()
            .map(|record| &record.task)
            .filter(|task| !task.is_completed())
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks_since(OffsetDateTime::UNIX_EPOCH)
    }

    /// Tasks whose start is strictly after `earliest`, in ascending order.
    pub fn tasks_since(&self, earliest: OffsetDateTime) -> Vec<Task> {
        self.records
            .iter()
            .filter(|record| record.task.start() > earliest)
            .map(|record| record.task.clone())
            .collect()
    }

    /// Tasks whose start falls on `day` or later, judged by the calendar date
    /// in each record's own offset (the key reports group by).
    pub fn tasks_from_day(&self, day: Date) -> Vec<Task> {
        self.records
            .iter()
            .filter(|record| record.task.start().date() >= day)
            .map(|record| record.task.clone())
            .collect()
    }

    pub fn save(&self) -> Result<(), AppError> {
        let tasks: Vec<Task> = self.records.iter().map(|record| record.task.clone()).collect();
        line_store::save_tasks(&self.backing_path, &tasks)
    }
}
