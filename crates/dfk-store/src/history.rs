use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use dfk_core::{Day, HistoryRecord, OptionId};

use crate::error::Result;
use crate::model::{PickRecord, PickSource};
use crate::store::{Store, parse_day, parse_uuid};

const PICK_COLUMNS: &str = "id, category_id, option_id, day, picked_at, source, roll, reason";

type PickRow = (String, String, Option<String>, String, String, String, u32, String);

impl Store {
    /// All picks for a category, newest day first.
    pub fn history_for_category(&self, category_id: Uuid, limit: Option<usize>) -> Result<Vec<PickRecord>> {
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PICK_COLUMNS} FROM picks WHERE category_id = ?1 ORDER BY day DESC LIMIT ?2"
        ))?;
        let rows: Vec<PickRow> = stmt
            .query_map(params![category_id.to_string(), limit], pick_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(into_pick).collect()
    }

    pub fn pick_for_day(&self, category_id: Uuid, day: Day) -> Result<Option<PickRecord>> {
        pick_for_day_on(self.conn(), category_id, day)
    }

    /// Reset one category's history. Returns the number of picks removed.
    pub fn clear_history(&self, category_id: Uuid) -> Result<usize> {
        let removed = self
            .conn()
            .execute("DELETE FROM picks WHERE category_id = ?1", [category_id.to_string()])?;
        tracing::info!(%category_id, removed, "cleared pick history");
        Ok(removed)
    }
}

pub(crate) fn pick_for_day_on(conn: &Connection, category_id: Uuid, day: Day) -> Result<Option<PickRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {PICK_COLUMNS} FROM picks WHERE category_id = ?1 AND day = ?2"),
            params![category_id.to_string(), day.to_string()],
            pick_row,
        )
        .optional()?;
    row.map(into_pick).transpose()
}

/// Engine view of a category's history: picks whose option still exists,
/// excluding `day` itself.
pub(crate) fn engine_history_on(conn: &Connection, category_id: Uuid, day: Day) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT option_id, day FROM picks
         WHERE category_id = ?1 AND option_id IS NOT NULL AND day != ?2",
    )?;
    let rows: Vec<(String, String)> = stmt
        .query_map(params![category_id.to_string(), day.to_string()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<std::result::Result<_, _>>()?;
    rows.into_iter()
        .map(|(option_id, day)| {
            Ok(HistoryRecord::new(
                OptionId(parse_uuid(&option_id)?),
                parse_day(&day)?,
            ))
        })
        .collect()
}

pub(crate) fn insert_pick_on(conn: &Connection, pick: &PickRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO picks (id, category_id, option_id, day, picked_at, source, roll, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            pick.id.to_string(),
            pick.category_id.to_string(),
            pick.option_id.map(|id| id.to_string()),
            pick.day.to_string(),
            pick.picked_at,
            pick.source.as_str(),
            pick.roll,
            pick.reason,
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_pick_on(conn: &Connection, pick_id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM picks WHERE id = ?1", [pick_id.to_string()])?;
    Ok(())
}

fn pick_row(row: &Row<'_>) -> rusqlite::Result<PickRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_pick(
    (id, category_id, option_id, day, picked_at, source, roll, reason): PickRow,
) -> Result<PickRecord> {
    Ok(PickRecord {
        id: parse_uuid(&id)?,
        category_id: parse_uuid(&category_id)?,
        option_id: option_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(OptionId),
        day: parse_day(&day)?,
        picked_at,
        source: PickSource::from_raw(&source),
        roll,
        reason,
    })
}
