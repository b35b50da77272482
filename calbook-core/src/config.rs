//! User configuration at ~/.config/calbook/config.toml

use std::path::{Path, PathBuf};

use ::config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalbookError, CalbookResult};
use crate::registry::validate_timezone;

static DEFAULT_TIMEZONE: &str = "America/New_York";
static DEFAULT_CALENDAR: &str = "default";
static DEFAULT_EXPORT_DIR: &str = "~/calbook";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_calendar() -> String {
    DEFAULT_CALENDAR.to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

fn is_default_timezone(tz: &String) -> bool {
    tz == DEFAULT_TIMEZONE
}

fn is_default_calendar(name: &String) -> bool {
    name == DEFAULT_CALENDAR
}

fn is_default_export_dir(p: &PathBuf) -> bool {
    *p == default_export_dir()
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalbookConfig {
    /// Timezone of the calendar created at startup.
    #[serde(default = "default_timezone", skip_serializing_if = "is_default_timezone")]
    pub default_timezone: String,

    /// Name of the calendar created at startup.
    #[serde(default = "default_calendar", skip_serializing_if = "is_default_calendar")]
    pub default_calendar: String,

    /// Where `export cal` writes files given as bare names.
    #[serde(default = "default_export_dir", skip_serializing_if = "is_default_export_dir")]
    pub export_dir: PathBuf,

    /// Fail adds that collide instead of silently declining them.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_decline: bool,
}

impl Default for CalbookConfig {
    fn default() -> Self {
        CalbookConfig {
            default_timezone: default_timezone(),
            default_calendar: default_calendar(),
            export_dir: default_export_dir(),
            auto_decline: false,
        }
    }
}

impl CalbookConfig {
    pub fn config_path() -> CalbookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalbookError::Config("Could not determine config directory".into()))?
            .join("calbook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template there
    /// first if nothing exists yet.
    pub fn load() -> CalbookResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> CalbookResult<Self> {
        let config: CalbookConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| CalbookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalbookError::Config(e.to_string()))?;

        validate_timezone(&config.default_timezone)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Export directory with `~` expanded.
    pub fn export_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.export_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Resolve an export target. Bare file names land in the export
    /// directory; anything with a directory component is used as given.
    pub fn resolve_export_file(&self, file: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(file).into_owned());
        let is_bare = expanded
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty());

        if is_bare {
            self.export_path().join(expanded)
        } else {
            expanded
        }
    }

    /// Write this config to `path`, omitting values left at their defaults.
    pub fn save_to(&self, path: &Path) -> CalbookResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CalbookError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalbookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| CalbookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalbookResult<()> {
        let contents = format!(
            "\
# calbook configuration

# Timezone of the calendar created at startup:
# default_timezone = \"{}\"

# Name of the calendar created at startup:
# default_calendar = \"{}\"

# Where exports given as bare file names are written:
# export_dir = \"{}\"

# Reject conflicting events with an error instead of skipping them:
# auto_decline = false
",
            DEFAULT_TIMEZONE, DEFAULT_CALENDAR, DEFAULT_EXPORT_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalbookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalbookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
