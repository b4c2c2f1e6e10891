use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use nudge_core::dates::validate_timezone;
use nudge_core::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "nudge.toml";
pub const ENV_PREFIX: &str = "NUDGE_";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON file holding every task
    pub data_file: PathBuf,
    /// IANA timezone used to decide which calendar day an instant falls on
    pub timezone: String,
    /// Occurrences shown by `recur info` and `recur preview`
    pub preview_count: usize,
    /// Whether the today view keeps tasks that were finished today
    pub show_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("nudge.json"),
            timezone: detect_system_timezone(),
            preview_count: 5,
            show_completed: true,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn tz(&self) -> Result<Tz, CoreError> {
        validate_timezone(&self.timezone)
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if validate_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.data_file, PathBuf::from("nudge.json"));
        assert_eq!(config.preview_count, 5);
        assert!(config.tz().is_ok());
    }

    #[test]
    fn test_file_and_env_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    timezone = "Europe/Berlin"
                    preview_count = 8
                "#,
            )?;
            jail.set_env("NUDGE_PREVIEW_COUNT", "3");
            jail.set_env("NUDGE_DATA_FILE", "tasks/mine.json");

            let config = Config::new()?;
            assert_eq!(config.timezone, "Europe/Berlin");
            assert_eq!(config.preview_count, 3);
            assert_eq!(config.data_file, PathBuf::from("tasks/mine.json"));
            assert!(config.show_completed);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_timezone_is_reported() {
        let config = Config {
            timezone: "Mars/Olympus".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.tz(), Err(CoreError::InvalidTimezone(_))));
    }
}
