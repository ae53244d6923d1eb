use crate::error::AppError;
use crate::storage::line_store::DEFAULT_STORE_FILE;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKTRACKER_CONFIG_PATH";
const STORE_ENV_VAR: &str = "TASKTRACKER_STORE_PATH";

/// Report colour scheme. Stored in the config file by name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Theme {
    #[default]
    Default,
    Noir,
    Solarized,
}

impl Theme {
    /// Accepts loose spellings such as `Dark-Mode` or `SOLARIZED`. Unknown
    /// names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match cleaned.as_str() {
            "" | "default" | "vanilla" | "light" => Some(Self::Default),
            "noir" | "dark" | "darkmode" => Some(Self::Noir),
            "solarized" => Some(Self::Solarized),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Noir => "noir",
            Self::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Default => Palette {
                accent: "",
                muted: "",
                reset: "",
            },
            Self::Noir => Palette {
                accent: "\x1b[38;5;208m",
                muted: "\x1b[38;5;250m",
                reset: "\x1b[0m",
            },
            Self::Solarized => Palette {
                accent: "\x1b[38;5;108m",
                muted: "\x1b[38;5;250m",
                reset: "\x1b[0m",
            },
        }
    }
}

impl TryFrom<String> for Theme {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("unknown theme '{raw}'"))
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.name().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        paint(self.accent, self.reset, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        paint(self.muted, self.reset, text)
    }
}

fn paint(colour: &str, reset: &str, text: &str) -> String {
    if colour.is_empty() {
        text.to_string()
    } else {
        format!("{colour}{text}{reset}")
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl Config {
    /// The configured palette, or a plain one when output is not a terminal.
    pub fn palette(&self, colour: bool) -> Palette {
        if colour {
            self.theme.unwrap_or_default().palette()
        } else {
            Theme::Default.palette()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub theme: Option<Theme>,
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// `$TASKTRACKER_CONFIG_PATH`, else `tasktracker/config.json` under the
/// platform's per-user config directory.
pub fn config_path() -> Result<PathBuf, AppError> {
    if let Some(path) = env_path(CONFIG_ENV_VAR) {
        return Ok(path);
    }

    let (base_var, subdir) = if cfg!(windows) {
        ("APPDATA", None)
    } else {
        ("HOME", Some(".config"))
    };
    let mut path = env_path(base_var)
        .ok_or_else(|| AppError::invalid_argument(format!("{base_var} is not set")))?;
    path.extend(subdir);
    path.push("tasktracker");
    path.push(CONFIG_FILE_NAME);
    Ok(path)
}

/// Parse the config at `path`; `Ok(None)` when there is no file.
pub fn read_config(path: &Path) -> Result<Option<Config>, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };

    serde_json::from_str(&content).map(Some).map_err(|err| {
        AppError::invalid_argument(format!("invalid config {}: {}", path.display(), err))
    })
}

/// The user's config, or defaults plus the reason the file was unusable.
pub fn load_config() -> (Config, Option<AppError>) {
    match config_path().and_then(|path| read_config(&path)) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (Config::default(), Some(err)),
    }
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    Config {
        store_path: overrides
            .store_path
            .clone()
            .or_else(|| base.store_path.clone()),
        theme: overrides.theme.or(base.theme),
    }
}

/// Pick the backing store: explicit `--file`, then a `store_path` override,
/// then `$TASKTRACKER_STORE_PATH`, then the config file, then
/// `tasktracker.data` in the working directory.
pub fn resolve_store_path(
    file_flag: Option<&Path>,
    overrides: &ConfigOverrides,
    config: &Config,
) -> PathBuf {
    pick_store_path(file_flag, overrides, env_path(STORE_ENV_VAR), config)
}

fn pick_store_path(
    file_flag: Option<&Path>,
    overrides: &ConfigOverrides,
    from_env: Option<PathBuf>,
    config: &Config,
) -> PathBuf {
    file_flag
        .map(Path::to_path_buf)
        .or_else(|| overrides.store_path.clone())
        .or(from_env)
        .or_else(|| config.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
}
