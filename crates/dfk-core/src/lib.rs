//! Daily pick selection engine.
//!
//! Given a catalog of options, the history of past picks, a recency rule,
//! a reference day and a seed, selects exactly one option and explains
//! which relaxation level was needed. When no option satisfies the recency
//! window, the window shrinks one day at a time down to zero.
//!
//! Zero I/O: no clock, no ambient randomness, no persistence.

pub mod constants;
pub mod engine;
pub mod model;
pub mod relax;
pub mod rng;
pub mod seed;
pub mod time;

pub use constants::{DEFAULT_NO_REPEAT_DAYS, MAX_NO_REPEAT_DAYS};
pub use engine::pick;
pub use model::{HistoryRecord, OptionId, PickOption, Reason, Rule, Selection, SelectionRequest};
pub use relax::{Relaxation, relax};
pub use rng::{Lcg64, choose};
pub use seed::daily_seed;
pub use time::{Day, DayParseError, now_iso8601, now_unix_secs, unix_to_iso8601};
