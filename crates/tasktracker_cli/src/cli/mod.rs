use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasktracker_core::config::{ConfigOverrides, Theme};

#[derive(Parser, Debug)]
#[command(name = "tasktracker", author, version, about = "Track time spent on tasks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Task store to read and write (default: tasktracker.data)
    #[arg(short = 'f', long = "file", value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a task, completing the current one
    ///
    /// Example: tasktracker start "Write report"
    #[command(visible_alias = "s")]
    Start { name: Option<String> },
    /// Complete the current task
    ///
    /// Example: tasktracker complete
    #[command(visible_alias = "c")]
    Complete,
    /// Report time spent per task per day
    ///
    /// Example: tasktracker report
    /// Example: tasktracker report --since 2024-03-01
    #[command(visible_alias = "r")]
    Report {
        /// Only include tasks started on or after this date
        #[arg(long, value_name = "YYYY-MM-DD")]
        since: Option<String>,
    },
    /// Show the current task
    ///
    /// Example: tasktracker status
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StorePath,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_key(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let value = value_raw.trim().to_string();

    let target = match key.as_str() {
        "store_path" | "file" => {
            if value.is_empty() {
                return Err("store_path override cannot be empty".to_string());
            }
            ConfigOverrideTarget::StorePath
        }
        "theme" => {
            if Theme::parse(&value).is_none() {
                return Err(format!("unknown theme '{value}'"));
            }
            ConfigOverrideTarget::Theme
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Fold every `--config-override` flag into one set; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(PathBuf::from(parsed.value)),
            ConfigOverrideTarget::Theme => overrides.theme = Theme::parse(&parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_key(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
