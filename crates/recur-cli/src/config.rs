use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use recur_core::DEFAULT_OCCURRENCE_CAP;
use serde::{Deserialize, Serialize};

use crate::timezone::{detect_system_timezone, validate_timezone};

pub const DEFAULT_CONFIG_FILE: &str = "recur.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// IANA timezone occurrences are displayed in
    pub display_timezone: String,
    /// Hard cap for rules with neither COUNT nor UNTIL
    pub max_occurrences: usize,
    /// Default tracing filter when neither RUST_LOG nor -v is given
    pub log_level: String,
    /// chrono format string for occurrence tables
    pub datetime_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_timezone: detect_system_timezone(),
            max_occurrences: DEFAULT_OCCURRENCE_CAP,
            log_level: "warn".to_string(),
            datetime_format: "%Y-%m-%d %H:%M %Z".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `RECUR_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::figment(file).extract::<Config>()?.validated()
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("RECUR_"))
    }

    fn validated(self) -> Result<Self, figment::Error> {
        validate_timezone(&self.display_timezone)
            .map_err(|e| figment::Error::from(e.to_string()))?;
        if self.max_occurrences == 0 {
            return Err(figment::Error::from(
                "max_occurrences must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}
