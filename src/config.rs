use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::suggested_owners;
use crate::window::Window;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logbook: Option<PathBuf>,
    pub owners: Vec<String>,
    pub default_window: Window,
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logbook: None,
            owners: suggested_owners(),
            default_window: Window::All,
            log_level: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "failed to read {}: {err}", path.display()),
            ConfigError::Parse(path, err) => write!(f, "invalid settings in {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_settings(cli_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = cli_path.map(Path::to_path_buf).or_else(settings_path) else {
        return Ok(Settings::default());
    };
    read_settings(&path)
}

pub fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => return Err(ConfigError::Io(path.to_path_buf(), err)),
    };

    let mut settings: Settings =
        toml::from_str(&raw).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
    settings.owners.retain(|owner| !owner.trim().is_empty());
    if settings.owners.is_empty() {
        settings.owners = suggested_owners();
    }
    Ok(settings)
}

fn settings_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("BITACORA_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(path).join("bitacora").join(CONFIG_FILE));
    }

    env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("bitacora")
            .join(CONFIG_FILE)
    })
}
