use std::fmt;

use dfk_core::{Day, OptionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a pick came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSource {
    Auto,
    Reroll,
    Manual,
}

impl PickSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PickSource::Auto => "auto",
            PickSource::Reroll => "reroll",
            PickSource::Manual => "manual",
        }
    }

    /// Unknown values read back as `Auto`.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "reroll" => PickSource::Reroll,
            "manual" => PickSource::Manual,
            _ => PickSource::Auto,
        }
    }
}

impl fmt::Display for PickSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub no_repeat_days: u32,
}

impl Category {
    /// Key the daily seed is derived from.
    pub fn seed_key(&self) -> String {
        self.id.hyphenated().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: OptionId,
    pub category_id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub is_enabled: bool,
    pub created_at: String,
}

/// Durable record of one day's pick for one category. `option_id` is
/// `None` once the picked option has been deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRecord {
    pub id: Uuid,
    pub category_id: Uuid,
    pub option_id: Option<OptionId>,
    pub day: Day,
    pub picked_at: String,
    pub source: PickSource,
    pub roll: u32,
    pub reason: String,
}

/// User-entered option fields, normalized the way the option editor does:
/// trimmed name (required), trimmed notes (empty means none), trimmed tags
/// with empties dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionDraft {
    pub name: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl OptionDraft {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_tags<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.tags = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub(crate) fn normalized(&self) -> Option<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            notes: normalize_notes(self.notes.as_deref()),
            tags: normalize_tags(&self.tags),
        })
    }
}

/// Partial edit of an option. `None` fields are left untouched; notes set
/// to an empty string are cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

pub(crate) fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

pub(crate) fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma-separated tag string as typed by a user.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(&raw.split(',').collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_roundtrip_and_fallback() {
        for s in [PickSource::Auto, PickSource::Reroll, PickSource::Manual] {
            assert_eq!(PickSource::from_raw(s.as_str()), s);
        }
        assert_eq!(PickSource::from_raw("garbage"), PickSource::Auto);
    }

    #[test]
    fn test_draft_normalization() {
        let draft = OptionDraft::new("  Pizza ")
            .with_notes("   ")
            .with_tags(&[" Fast", "", "  ", "Cheap "]);
        let n = draft.normalized().unwrap();
        assert_eq!(n.name, "Pizza");
        assert_eq!(n.notes, None);
        assert_eq!(n.tags, ["Fast", "Cheap"]);
    }

    #[test]
    fn test_draft_requires_name() {
        assert!(OptionDraft::new("   ").normalized().is_none());
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("Fast, Healthy ,,"), ["Fast", "Healthy"]);
        assert!(parse_tag_list("").is_empty());
    }
}
