use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::Day;

/// Stable identifier of an option. Callers pass their storage ids straight
/// through so history correlates with the current catalog across calls.
///
/// Ordering compares the UUID bytes, which is the same order as the
/// lowercase hyphenated string form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub Uuid);

impl OptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Canonical string form (lowercase, hyphenated).
    pub fn canonical(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl Default for OptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OptionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A selectable choice as the engine sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickOption {
    pub id: OptionId,
    pub name: String,
}

impl PickOption {
    pub fn new(id: OptionId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// One past selection for the category being picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub option_id: OptionId,
    pub day: Day,
}

impl HistoryRecord {
    pub fn new(option_id: OptionId, day: Day) -> Self {
        Self { option_id, day }
    }
}

/// Recency rule: an option picked within the last `no_repeat_days` days
/// (today excluded) should not be picked again. Zero disables the rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub no_repeat_days: u32,
}

impl Rule {
    pub fn new(no_repeat_days: u32) -> Self {
        Self { no_repeat_days }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub catalog: Vec<PickOption>,
    pub history: Vec<HistoryRecord>,
    pub rule: Rule,
    pub reference_day: Day,
    pub seed: u64,
}

/// Which relaxation level produced the candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    /// The configured window was satisfiable as-is.
    Standard { days: u32 },
    /// The window had to shrink to `days` before any option qualified.
    Relaxed { days: u32 },
}

impl Reason {
    /// Window size that was actually applied.
    pub fn days(&self) -> u32 {
        match self {
            Reason::Standard { days } | Reason::Relaxed { days } => *days,
        }
    }

    pub fn is_relaxed(&self) -> bool {
        matches!(self, Reason::Relaxed { .. })
    }

    /// Short machine-readable tag: `standard` or `relaxed(n)`.
    pub fn tag(&self) -> String {
        match self {
            Reason::Standard { .. } => "standard".to_string(),
            Reason::Relaxed { days } => format!("relaxed({days})"),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Standard { days } => write!(f, "Standard logic (no repeats in {days} days)"),
            Reason::Relaxed { days } => write!(f, "Relaxed repeat rule to {days} days"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub option_id: OptionId,
    /// Window size the candidates were drawn under; equals `reason.days()`.
    pub level: u32,
    pub reason: Reason,
}
