use std::fs;
use std::path::{Path, PathBuf};
use std::env;

use dfk_core::Day;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::store::Store;

pub const DB_FILE: &str = "dfk.db";

/// Default base directory for all dfk storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".decision-fatigue-killer")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// The store plus the configuration found next to it.
///
/// Layout:
/// ```text
/// ~/.decision-fatigue-killer/
/// ├── config.toml   (optional)
/// └── dfk.db
/// ```
pub struct AppStore {
    store: Store,
    config: Config,
    base_dir: PathBuf,
}

impl AppStore {
    /// Open the data directory, creating it as needed, and seed the starter
    /// categories on first run unless the config turns that off.
    /// `base_dir`: override the base directory (for testing).
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        fs::create_dir_all(&base).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", base.display()))
        })?;

        let config = Config::load_from_dir(&base)?;
        let store = Store::open(&base.join(DB_FILE))?;
        Self::with_store(store, config, base)
    }

    /// Open with an in-memory store (for testing).
    pub fn open_in_memory(config: Config) -> Result<Self> {
        Self::with_store(Store::open_in_memory()?, config, PathBuf::from(":memory:"))
    }

    fn with_store(store: Store, config: Config, base_dir: PathBuf) -> Result<Self> {
        if config.seed_defaults {
            store.seed_defaults(config.default_no_repeat_days)?;
        }
        Ok(Self {
            store,
            config,
            base_dir,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `date` if given, otherwise today's local day per the config.
    pub fn reference_day(&self, date: Option<Day>) -> Day {
        date.unwrap_or_else(|| self.config.today())
    }

    /// Wipe everything and re-seed, using the configured default window.
    pub fn reset_all(&self) -> Result<()> {
        self.store.reset_all(self.config.default_no_repeat_days)
    }

    pub fn add_category(&self, name: &str) -> Result<crate::model::Category> {
        self.store
            .add_category(name, self.config.default_no_repeat_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_creation() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested").join("data");

        let app = AppStore::open(Some(&base)).unwrap();
        assert_eq!(app.base_dir(), base.as_path());
        assert!(base.join(DB_FILE).exists());
        assert_eq!(app.store().list_categories().unwrap().len(), 3);
    }

    #[test]
    fn test_config_controls_seeding_and_window() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "seed_defaults = false\ndefault_no_repeat_days = 5\n",
        )
        .unwrap();

        let app = AppStore::open(Some(dir.path())).unwrap();
        assert!(app.store().list_categories().unwrap().is_empty());

        let reading = app.add_category("Reading").unwrap();
        assert_eq!(reading.no_repeat_days, 5);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let day = Day::from_ymd(2026, 10, 16).unwrap();
        let first = {
            let app = AppStore::open(Some(dir.path())).unwrap();
            let meal = app.store().require_category("Meal").unwrap();
            app.store().today_pick(&meal, day).unwrap().unwrap()
        };

        let app = AppStore::open(Some(dir.path())).unwrap();
        assert_eq!(app.store().list_categories().unwrap().len(), 3, "no double seeding");
        let meal = app.store().require_category("Meal").unwrap();
        assert_eq!(app.store().pick_for_day(meal.id, day).unwrap(), Some(first));
    }

    #[test]
    fn test_reference_day_override() {
        let app = AppStore::open_in_memory(Config::default()).unwrap();
        let day = Day::from_ymd(2030, 1, 1).unwrap();
        assert_eq!(app.reference_day(Some(day)), day);
    }

    #[test]
    fn test_default_base_dir_is_named() {
        assert!(default_base_dir().ends_with(".decision-fatigue-killer"));
    }
}
