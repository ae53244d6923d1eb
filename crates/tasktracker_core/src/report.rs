use crate::config::Palette;
use crate::error::AppError;
use crate::model::Task;
use std::collections::BTreeMap;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub date: Date,
    pub entries: Vec<ReportEntry>,
    pub total_minutes: f64,
}

/// Sum task durations per calendar day of their start, merging names that
/// differ only in case. Days come out ascending and names in case-insensitive
/// order; the first spelling seen for a name is the one reported.
pub fn build_report(tasks: &[Task], now: OffsetDateTime) -> Vec<DayReport> {
    let mut days: BTreeMap<Date, BTreeMap<String, ReportEntry>> = BTreeMap::new();

    for task in tasks {
        let entry = days
            .entry(task.start().date())
            .or_default()
            .entry(task.name().to_lowercase())
            .or_insert_with(|| ReportEntry {
                name: task.name().to_string(),
                minutes: 0.0,
            });
        entry.minutes += task.duration_minutes(now);
    }

    days.into_iter()
        .map(|(date, entries)| {
            let entries: Vec<ReportEntry> = entries.into_values().collect();
            let total_minutes: f64 = entries.iter().map(|entry| entry.minutes).sum();
            DayReport {
                date,
                entries,
                total_minutes,
            }
        })
        .collect()
}

/// `H:MM` with whole minutes truncated toward zero.
pub fn format_minutes(minutes: f64) -> String {
    let whole = if minutes.is_finite() && minutes > 0.0 {
        minutes.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}", whole / 60, whole % 60)
}

pub fn format_day(date: Date) -> Result<String, AppError> {
    date.format(format_description!(
        "[weekday], [month repr:long] [day padding:none], [year]"
    ))
    .map_err(|err| AppError::invalid_argument(format!("cannot format date: {err}")))
}

pub fn render_report(days: &[DayReport], palette: &Palette) -> Result<String, AppError> {
    let mut out = String::new();

    for day in days {
        out.push_str(&palette.accentize(&format_day(day.date)?));
        out.push('\n');

        for entry in &day.entries {
            out.push_str(&format!("{}: {}\n", entry.name, format_minutes(entry.minutes)));
        }

        let total = format!("Total: {}", format_minutes(day.total_minutes));
        out.push_str(&palette.mutedize(&total));
        out.push_str("\n\n");
    }

    Ok(out)
}
