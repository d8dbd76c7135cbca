pub mod app;
pub mod config;
pub mod daily;
pub mod defaults;
pub mod error;
pub mod history;
pub mod model;
pub mod schema;
pub mod store;

pub use app::{AppStore, default_base_dir};
pub use config::Config;
pub use daily::{DailyPick, MANUAL_REASON};
pub use error::{Result, StoreError};
pub use model::{Category, OptionDraft, OptionItem, OptionUpdate, PickRecord, PickSource, parse_tag_list};
pub use store::Store;
