//! `config.toml` in the data directory.
//!
//! ```toml
//! utc_offset_minutes = 120     # where the local day starts, relative to UTC
//! default_no_repeat_days = 3   # window given to new categories
//! seed_defaults = true         # create Meal/Outfit/Workout on first run
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use dfk_core::{DEFAULT_NO_REPEAT_DAYS, Day, MAX_NO_REPEAT_DAYS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "config.toml";

/// Widest real-world UTC offsets are -12:00 and +14:00.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub utc_offset_minutes: i32,
    pub default_no_repeat_days: u32,
    pub seed_defaults: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            default_no_repeat_days: DEFAULT_NO_REPEAT_DAYS,
            seed_defaults: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| StoreError::InvalidData(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from `dir`. A missing file means defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| match e {
                StoreError::InvalidData(msg) => {
                    StoreError::InvalidData(format!("{}: {msg}", path.display()))
                }
                other => other,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::InvalidData(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(StoreError::InvalidData(format!(
                "utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}, got {}",
                self.utc_offset_minutes
            )));
        }
        if self.default_no_repeat_days > MAX_NO_REPEAT_DAYS {
            return Err(StoreError::InvalidData(format!(
                "default_no_repeat_days must be 0..={MAX_NO_REPEAT_DAYS}, got {}",
                self.default_no_repeat_days
            )));
        }
        Ok(())
    }

    /// The current local day under this configuration.
    pub fn today(&self) -> Day {
        Day::today(self.utc_offset_minutes)
    }
}
