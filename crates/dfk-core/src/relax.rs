//! Recency filter and monotonic relaxation loop.
//!
//! At level `n` an option is prohibited when the history holds a pick of it
//! dated inside `[reference_day - n, reference_day)`. The loop starts at the
//! configured window and shrinks it one day at a time until some option
//! survives. Level 0 has an empty window, so any non-empty catalog yields
//! candidates by then.

use std::collections::HashSet;

use crate::model::{HistoryRecord, OptionId, PickOption, Reason, Rule};
use crate::time::Day;

/// Outcome of the relaxation loop: the surviving candidates, in catalog
/// order, and the level they were found at.
#[derive(Clone, Debug)]
pub struct Relaxation<'a> {
    pub candidates: Vec<&'a PickOption>,
    pub reason: Reason,
}

impl Relaxation<'_> {
    pub fn level(&self) -> u32 {
        self.reason.days()
    }
}

/// Collapse repeated ids, keeping the first occurrence.
pub fn distinct(catalog: &[PickOption]) -> Vec<&PickOption> {
    let mut seen = HashSet::with_capacity(catalog.len());
    catalog.iter().filter(|o| seen.insert(o.id)).collect()
}

/// Whole days between a history record and the reference day, for records
/// strictly before it. Same-day and future records have no age.
fn age(record: &HistoryRecord, reference_day: Day) -> Option<u32> {
    let days = record.day.days_until(reference_day);
    if days >= 1 {
        u32::try_from(days).ok()
    } else {
        None
    }
}

/// Option ids prohibited at `level`. Records for ids outside `known` are
/// ignored so removed options never block anything.
pub fn prohibited(
    history: &[HistoryRecord],
    known: &HashSet<OptionId>,
    reference_day: Day,
    level: u32,
) -> HashSet<OptionId> {
    history
        .iter()
        .filter(|r| known.contains(&r.option_id))
        .filter(|r| age(r, reference_day).is_some_and(|a| a <= level))
        .map(|r| r.option_id)
        .collect()
}

/// Run the relaxation loop. Returns `None` only for an empty catalog.
///
/// Levels above the oldest in-window record share its prohibition set, so
/// the descent begins there; the reported level is the same one a plain
/// one-day-at-a-time descent from the rule's window would report.
pub fn relax<'a>(
    catalog: &'a [PickOption],
    history: &[HistoryRecord],
    rule: Rule,
    reference_day: Day,
) -> Option<Relaxation<'a>> {
    let catalog = distinct(catalog);
    if catalog.is_empty() {
        return None;
    }

    let known: HashSet<OptionId> = catalog.iter().map(|o| o.id).collect();
    let window = rule.no_repeat_days;
    let horizon = history
        .iter()
        .filter(|r| known.contains(&r.option_id))
        .filter_map(|r| age(r, reference_day))
        .filter(|&a| a <= window)
        .max()
        .unwrap_or(0);
    let start = window.min(horizon);

    (0..=start).rev().find_map(|level| {
        let banned = prohibited(history, &known, reference_day, level);
        let candidates: Vec<&PickOption> = catalog
            .iter()
            .copied()
            .filter(|o| !banned.contains(&o.id))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let reason = if level == start {
            Reason::Standard { days: window }
        } else {
            Reason::Relaxed { days: level }
        };
        Some(Relaxation { candidates, reason })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn opts(names: &[&str]) -> Vec<PickOption> {
        names
            .iter()
            .map(|n| PickOption::new(OptionId::new(), n))
            .collect()
    }

    fn names(r: &Relaxation<'_>) -> Vec<String> {
        r.candidates.iter().map(|o| o.name.clone()).collect()
    }

    #[test]
    fn test_empty_catalog_short_circuits() {
        let today = day("2026-03-10");
        assert!(relax(&[], &[], Rule::new(3), today).is_none());
    }

    #[test]
    fn test_no_history_is_standard() {
        let catalog = opts(&["A", "B", "C"]);
        let r = relax(&catalog, &[], Rule::new(3), day("2026-03-10")).unwrap();
        assert_eq!(names(&r), ["A", "B", "C"]);
        assert_eq!(r.reason, Reason::Standard { days: 3 });
        assert_eq!(r.level(), 3);
    }

    #[test]
    fn test_recent_pick_excluded() {
        let today = day("2026-03-10");
        let catalog = opts(&["A", "B"]);
        let history = [HistoryRecord::new(catalog[0].id, today.offset(-1))];
        let r = relax(&catalog, &history, Rule::new(3), today).unwrap();
        assert_eq!(names(&r), ["B"]);
        assert_eq!(r.reason, Reason::Standard { days: 3 });
    }

    #[test]
    fn test_window_boundary() {
        let today = day("2026-03-10");
        let catalog = opts(&["A", "B"]);
        let a = catalog[0].id;
        let known: HashSet<OptionId> = catalog.iter().map(|o| o.id).collect();

        // Exactly N days before: inside the window.
        let at_edge = [HistoryRecord::new(a, today.offset(-3))];
        assert!(prohibited(&at_edge, &known, today, 3).contains(&a));

        // N+1 days before: outside.
        let past_edge = [HistoryRecord::new(a, today.offset(-4))];
        assert!(prohibited(&past_edge, &known, today, 3).is_empty());

        // Same day: never a prohibition.
        let same_day = [HistoryRecord::new(a, today)];
        assert!(prohibited(&same_day, &known, today, 3).is_empty());

        // Future-dated record: ignored.
        let future = [HistoryRecord::new(a, today.offset(2))];
        assert!(prohibited(&future, &known, today, 3).is_empty());
    }

    #[test]
    fn test_unknown_history_ignored() {
        let today = day("2026-03-10");
        let catalog = opts(&["A"]);
        let known: HashSet<OptionId> = catalog.iter().map(|o| o.id).collect();
        let stale = [HistoryRecord::new(OptionId::new(), today.offset(-1))];
        assert!(prohibited(&stale, &known, today, 3).is_empty());

        let r = relax(&catalog, &stale, Rule::new(3), today).unwrap();
        assert_eq!(r.reason, Reason::Standard { days: 3 });
    }

    #[test]
    fn test_relaxes_to_zero_for_single_option() {
        let today = day("2026-03-10");
        let catalog = opts(&["A"]);
        let history = [HistoryRecord::new(catalog[0].id, today.offset(-1))];
        let r = relax(&catalog, &history, Rule::new(3), today).unwrap();
        assert_eq!(names(&r), ["A"]);
        assert_eq!(r.reason, Reason::Relaxed { days: 0 });
    }

    #[test]
    fn test_relaxes_to_largest_satisfiable_level() {
        let today = day("2026-03-10");
        let catalog = opts(&["A", "B", "C"]);
        // A yesterday, B two days ago, C five days ago; window 5.
        let history = [
            HistoryRecord::new(catalog[0].id, today.offset(-1)),
            HistoryRecord::new(catalog[1].id, today.offset(-2)),
            HistoryRecord::new(catalog[2].id, today.offset(-5)),
        ];
        let r = relax(&catalog, &history, Rule::new(5), today).unwrap();
        // Levels 5..2 block everything, level 4 is the first to free C.
        assert_eq!(r.reason, Reason::Relaxed { days: 4 });
        assert_eq!(names(&r), ["C"]);
    }

    #[test]
    fn test_zero_rule_allows_everything() {
        let today = day("2026-03-10");
        let catalog = opts(&["A"]);
        let history = [HistoryRecord::new(catalog[0].id, today.offset(-1))];
        let r = relax(&catalog, &history, Rule::new(0), today).unwrap();
        assert_eq!(r.reason, Reason::Standard { days: 0 });
        assert_eq!(names(&r), ["A"]);
    }

    #[test]
    fn test_old_history_keeps_standard_for_wide_window() {
        let today = day("2026-03-10");
        let catalog = opts(&["A", "B"]);
        let history = [HistoryRecord::new(catalog[0].id, today.offset(-2))];
        let r = relax(&catalog, &history, Rule::new(14), today).unwrap();
        assert_eq!(r.reason, Reason::Standard { days: 14 });
        assert_eq!(names(&r), ["B"]);
    }

    #[test]
    fn test_duplicate_ids_collapsed() {
        let id = OptionId::new();
        let catalog = vec![PickOption::new(id, "A"), PickOption::new(id, "A again")];
        let d = distinct(&catalog);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].name, "A");
    }
}
