//! The daily pick flow: read catalog and history, run the engine once,
//! persist the result. Each call runs inside an IMMEDIATE transaction so
//! two processes opening the app at once cannot both write a pick for the
//! same category and day.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

use dfk_core::{Day, OptionId, PickOption, Rule, SelectionRequest, daily_seed, now_iso8601, pick};

use crate::error::{Result, StoreError};
use crate::history::{delete_pick_on, engine_history_on, insert_pick_on, pick_for_day_on};
use crate::model::{Category, OptionItem, PickRecord, PickSource};
use crate::store::{Store, enabled_options_on, option_on};

pub const MANUAL_REASON: &str = "Chosen manually";

/// A category together with its pick for the day, if one could be made.
#[derive(Clone, Debug)]
pub struct DailyPick {
    pub category: Category,
    pub record: Option<PickRecord>,
    pub option: Option<OptionItem>,
}

impl Store {
    /// Return the day's pick for `category`, drawing one if none exists.
    /// `None` means the category has no enabled options.
    pub fn today_pick(&self, category: &Category, day: Day) -> Result<Option<PickRecord>> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        if let Some(existing) = pick_for_day_on(&tx, category.id, day)? {
            tx.commit()?;
            return Ok(Some(existing));
        }
        let created = draw_on(&tx, category, day, PickSource::Auto, 0)?;
        tx.commit()?;
        Ok(created)
    }

    /// Replace the day's pick with a fresh draw. The previous pick is
    /// removed first, so the engine never sees it as history; the re-roll
    /// counter moves the seed so the draw differs from the last one.
    pub fn reroll(&self, category: &Category, day: Day) -> Result<Option<PickRecord>> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        let roll = match pick_for_day_on(&tx, category.id, day)? {
            Some(existing) => {
                delete_pick_on(&tx, existing.id)?;
                existing.roll + 1
            }
            None => 1,
        };
        let created = draw_on(&tx, category, day, PickSource::Reroll, roll)?;
        tx.commit()?;
        tracing::info!(category = %category.name, %day, roll, "re-rolled pick");
        Ok(created)
    }

    /// Record a user's explicit choice for the day, replacing any pick.
    pub fn choose_manually(&self, category: &Category, option_id: OptionId, day: Day) -> Result<PickRecord> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        let option = option_on(&tx, option_id)?
            .filter(|o| o.category_id == category.id)
            .ok_or_else(|| StoreError::NotFound(format!("option {option_id} in '{}'", category.name)))?;

        let roll = match pick_for_day_on(&tx, category.id, day)? {
            Some(existing) => {
                delete_pick_on(&tx, existing.id)?;
                existing.roll
            }
            None => 0,
        };
        let record = PickRecord {
            id: Uuid::new_v4(),
            category_id: category.id,
            option_id: Some(option.id),
            day,
            picked_at: now_iso8601(),
            source: PickSource::Manual,
            roll,
            reason: MANUAL_REASON.to_string(),
        };
        insert_pick_on(&tx, &record)?;
        tx.commit()?;
        tracing::info!(category = %category.name, option = %option.name, %day, "manual pick");
        Ok(record)
    }

    /// Get-or-create the day's pick for every category, joined with the
    /// picked option for display.
    pub fn today_picks(&self, day: Day) -> Result<Vec<DailyPick>> {
        self.list_categories()?
            .into_iter()
            .map(|category| {
                let record = self.today_pick(&category, day)?;
                let option = match record.as_ref().and_then(|r| r.option_id) {
                    Some(id) => self.option(id)?,
                    None => None,
                };
                Ok(DailyPick {
                    category,
                    record,
                    option,
                })
            })
            .collect()
    }
}

/// Run the engine for one category/day and insert the result.
fn draw_on(
    conn: &Connection,
    category: &Category,
    day: Day,
    source: PickSource,
    roll: u32,
) -> Result<Option<PickRecord>> {
    let catalog: Vec<PickOption> = enabled_options_on(conn, category.id)?
        .into_iter()
        .map(|o| PickOption::new(o.id, &o.name))
        .collect();
    let request = SelectionRequest {
        catalog,
        history: engine_history_on(conn, category.id, day)?,
        rule: Rule::new(category.no_repeat_days),
        reference_day: day,
        seed: daily_seed(&category.seed_key(), day, roll),
    };

    let Some(selection) = pick(&request) else {
        tracing::info!(category = %category.name, %day, "no enabled options");
        return Ok(None);
    };

    let record = PickRecord {
        id: Uuid::new_v4(),
        category_id: category.id,
        option_id: Some(selection.option_id),
        day,
        picked_at: now_iso8601(),
        source,
        roll,
        reason: selection.reason.to_string(),
    };
    insert_pick_on(conn, &record)?;
    if selection.reason.is_relaxed() {
        tracing::info!(
            category = %category.name,
            %day,
            level = selection.level,
            "no option clear of the full window, relaxed"
        );
    }
    tracing::debug!(
        category = %category.name,
        %day,
        reason = %selection.reason.tag(),
        "created pick"
    );
    Ok(Some(record))
}
