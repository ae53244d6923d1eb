use crate::error::AppError;
use time::OffsetDateTime;

/// One tracked activity. Open tasks have no meaningful end; `end` mirrors
/// `start` until the task is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    start: OffsetDateTime,
    end: OffsetDateTime,
    completed: bool,
}

impl Task {
    pub fn new_open(name: &str, start: OffsetDateTime) -> Result<Self, AppError> {
        let name = validate_name(name)?;
        Ok(Self {
            name,
            start,
            end: start,
            completed: false,
        })
    }

    pub fn new_closed(
        name: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Self, AppError> {
        let name = validate_name(name)?;
        if end < start {
            return Err(AppError::invalid_argument(
                "end cannot be before the start",
            ));
        }

        Ok(Self {
            name,
            start,
            end,
            completed: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// The completion time, or `None` while the task is still open.
    pub fn end(&self) -> Option<OffsetDateTime> {
        self.completed.then_some(self.end)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn complete(&mut self, at: OffsetDateTime) -> Result<(), AppError> {
        if self.completed {
            return Err(AppError::already_completed(format!(
                "task '{}' already completed",
                self.name
            )));
        }
        if at < self.start {
            return Err(AppError::invalid_argument(
                "completion cannot be before the start",
            ));
        }

        self.completed = true;
        self.end = at;
        Ok(())
    }

    /// Minutes between start and end, using `now` in place of the end while
    /// the task is open.
    pub fn duration_minutes(&self, now: OffsetDateTime) -> f64 {
        let until = if self.completed { self.end } else { now };
        (until - self.start).as_seconds_f64() / 60.0
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("task name is required"));
    }
    if trimmed.contains([';', '\n', '\r']) {
        return Err(AppError::invalid_argument(
            "task name cannot contain ';' or line breaks",
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::Task;
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn new_open_starts_incomplete() {
        let start = datetime!(2024-03-01 09:00 -5);
        let task = Task::new_open("Write", start).unwrap();

        assert_eq!(task.name(), "Write");
        assert_eq!(task.start(), start);
        assert_eq!(task.end(), None);
        assert!(!task.is_completed());
    }

    #[test]
    fn new_open_trims_name() {
        let task = Task::new_open("  Read  ", datetime!(2024-03-01 09:00 UTC)).unwrap();
        assert_eq!(task.name(), "Read");
    }

    #[test]
    fn new_open_rejects_blank_name() {
        let err = Task::new_open("   ", datetime!(2024-03-01 09:00 UTC)).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn new_open_rejects_separator_in_name() {
        let err = Task::new_open("a;b", datetime!(2024-03-01 09:00 UTC)).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");

        let err = Task::new_open("a\nb", datetime!(2024-03-01 09:00 UTC)).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn new_closed_rejects_end_before_start() {
        let err = Task::new_closed(
            "Write",
            datetime!(2024-03-01 10:00 UTC),
            datetime!(2024-03-01 09:59 UTC),
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn new_closed_accepts_zero_length() {
        let at = datetime!(2024-03-01 10:00 UTC);
        let task = Task::new_closed("Write", at, at).unwrap();
        assert!(task.is_completed());
        assert_eq!(task.end(), Some(at));
    }

    #[test]
    fn complete_sets_end_once() {
        let start = datetime!(2024-03-01 09:00 UTC);
        let mut task = Task::new_open("Write", start).unwrap();

        task.complete(start + Duration::minutes(30)).unwrap();
        assert!(task.is_completed());
        assert_eq!(task.end(), Some(datetime!(2024-03-01 09:30 UTC)));

        let err = task.complete(start + Duration::hours(1)).unwrap_err();
        assert_eq!(err.code(), "already_completed");
        assert_eq!(task.end(), Some(datetime!(2024-03-01 09:30 UTC)));
    }

    #[test]
    fn complete_rejects_time_before_start() {
        let start = datetime!(2024-03-01 09:00 UTC);
        let mut task = Task::new_open("Write", start).unwrap();

        let err = task.complete(start - Duration::seconds(1)).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
        assert!(!task.is_completed());
    }

    #[test]
    fn duration_uses_end_when_completed() {
        let task = Task::new_closed(
            "Write",
            datetime!(2024-03-01 09:00 UTC),
            datetime!(2024-03-01 09:45:30 UTC),
        )
        .unwrap();

        let minutes = task.duration_minutes(datetime!(2024-03-02 00:00 UTC));
        assert!((minutes - 45.5).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_uses_now_when_open() {
        let task = Task::new_open("Write", datetime!(2024-03-01 09:00 UTC)).unwrap();

        let minutes = task.duration_minutes(datetime!(2024-03-01 11:05 UTC));
        assert!((minutes - 125.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_compares_instants_across_offsets() {
        let task = Task::new_closed(
            "Write",
            datetime!(2024-03-01 09:00 -5),
            datetime!(2024-03-01 15:00 UTC),
        )
        .unwrap();

        let minutes = task.duration_minutes(datetime!(2024-03-02 00:00 UTC));
        assert!((minutes - 60.0).abs() < f64::EPSILON);
    }
}
