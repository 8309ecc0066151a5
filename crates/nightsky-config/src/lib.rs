//! Configuration for nightsky.
//!
//! Settings live in `config.toml` under the platform config directory.
//! Every field has a default, so a missing file or a partial file both load.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use log::{LevelFilter, debug, warn};
use nightsky_core::AnimationSpeed;
use nightsky_starfield::{DEFAULT_STAR_COUNT, StarfieldSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Platform directories for nightsky.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "nightsky")
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
    pub starfield: StarfieldConfig,
    pub profile: ProfileConfig,
    pub stats: StatsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            starfield: StarfieldConfig::default(),
            profile: ProfileConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

/// Background sky settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub star_count: usize,
    pub speed: AnimationSpeed,
    pub constellation_lines: bool,
    pub shooting_stars: bool,
    pub seed: Option<u64>,
    pub spawn_interval_min_ms: u64,
    pub spawn_interval_max_ms: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        let defaults = StarfieldSettings::default();
        Self {
            star_count: DEFAULT_STAR_COUNT,
            speed: defaults.speed,
            constellation_lines: defaults.constellation_lines,
            shooting_stars: defaults.shooting_stars,
            seed: None,
            spawn_interval_min_ms: defaults.spawn_interval_min_ms,
            spawn_interval_max_ms: defaults.spawn_interval_max_ms,
        }
    }
}

impl StarfieldConfig {
    /// Simulation settings for these options.
    pub fn settings(&self) -> StarfieldSettings {
        StarfieldSettings {
            star_count: self.star_count,
            speed: self.speed,
            constellation_lines: self.constellation_lines,
            shooting_stars: self.shooting_stars,
            seed: self.seed,
            spawn_interval_min_ms: self.spawn_interval_min_ms,
            spawn_interval_max_ms: self.spawn_interval_max_ms,
        }
    }
}

/// Foreground profile card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub tagline: String,
    pub links: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "Arpita Maurya".to_string(),
            tagline: "Electronics & Communications Engineering Student".to_string(),
            links: vec![
                "https://github.com/07arpita".to_string(),
                "https://www.linkedin.com/in/arpita-maurya-57a4532a4".to_string(),
            ],
        }
    }
}

/// Coding-profile statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub enabled: bool,
    pub username: String,
    pub refresh_hours: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: "arpita_27".to_string(),
            refresh_hours: 24,
        }
    }
}

impl StatsConfig {
    /// Time between fetches; at least an hour, saturating for huge values.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_hours.max(1).saturating_mul(60 * 60))
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!("loading config from {}", path.display());
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_toml_string()?).map_err(io_err)
    }

    /// Parsed log level; unknown names fall back to `info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            warn!("unknown log level {:?}, using info", self.log_level);
            LevelFilter::Info
        })
    }
}
