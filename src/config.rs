use std::{io, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    clock::Poller,
    ical::{LoadPolicy, SaveOptions},
    queue::DEFAULT_CAPACITY,
};

const APP_NAME: &str = "roosty_alarms";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't access config file: {0}")]
    Io(#[from] io::Error),
    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("couldn't find a home directory for the config")]
    NoHome,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// the iCalendar file alarms are kept in between runs
    pub alarms_file: PathBuf,
    pub poll_interval_secs: u64,
    /// starting size of the alarm queue, it grows past this if needed
    pub queue_capacity: usize,
    pub on_bad_record: LoadPolicy,
    /// write a reminder block into each saved event
    pub reminders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarms_file: Self::data_path()
                .map_or_else(|_| PathBuf::from("alarms.ics"), |dir| dir.join("alarms.ics")),
            poll_interval_secs: 1,
            queue_capacity: DEFAULT_CAPACITY,
            on_bad_record: LoadPolicy::Skip,
            reminders: true,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// if the file can't be read or isn't valid config
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&config)?)
    }

    /// like [`Config::load`] but a missing file gives the defaults
    ///
    /// # Errors
    /// if the file exists but can't be read or parsed
    pub fn load_or_default(path: PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// # Errors
    /// if the config or its directory can't be written
    pub fn save(&self, path: PathBuf) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config)?;
        Ok(())
    }

    /// # Errors
    /// if there is no home directory
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = directories::ProjectDirs::from("", "", APP_NAME)
            .ok_or(ConfigError::NoHome)?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    /// # Errors
    /// if there is no home directory
    pub fn data_path() -> Result<PathBuf, ConfigError> {
        Ok(directories::ProjectDirs::from("", "", APP_NAME)
            .ok_or(ConfigError::NoHome)?
            .data_dir()
            .to_path_buf())
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_ok_and(|path| path.exists())
    }

    #[must_use]
    pub const fn poller(&self) -> Poller {
        Poller::new(Duration::from_secs(self.poll_interval_secs))
    }

    #[must_use]
    pub const fn save_options(&self) -> SaveOptions {
        SaveOptions {
            reminders: self.reminders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config =
            toml::from_str("poll_interval_secs = 5\non_bad_record = \"abort\"").unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.on_bad_record, LoadPolicy::Abort);
        assert_eq!(config.queue_capacity, DEFAULT_CAPACITY);
        assert!(config.reminders);
        assert_eq!(config.poller().interval, Duration::from_secs(5));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let config = Config {
            alarms_file: dir.path().join("alarms.ics"),
            poll_interval_secs: 2,
            queue_capacity: 32,
            on_bad_record: LoadPolicy::Abort,
            reminders: false,
        };
        config.save(path.clone()).unwrap();
        assert_eq!(Config::load(path).unwrap(), config);
        assert!(!config.save_options().reminders);
    }

    #[test]
    fn load_or_default_handles_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_or_default(path.clone()).unwrap(), Config::default());
        std::fs::write(&path, "queue_capacity = \"lots\"").unwrap();
        assert!(matches!(
            Config::load_or_default(path),
            Err(ConfigError::Parse(_))
        ));
    }
}
