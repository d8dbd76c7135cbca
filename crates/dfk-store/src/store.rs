use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use dfk_core::{Day, MAX_NO_REPEAT_DAYS, OptionId, now_iso8601};

use crate::error::{Result, StoreError};
use crate::model::{Category, OptionDraft, OptionItem, OptionUpdate, normalize_notes, normalize_tags};
use crate::schema;

pub struct Store {
    conn: Connection,
}

const CATEGORY_COLUMNS: &str = "id, name, created_at, no_repeat_days";
const OPTION_COLUMNS: &str = "id, category_id, name, notes, tags, is_enabled, created_at";

type CategoryRow = (String, String, String, u32);
type OptionRow = (String, String, String, Option<String>, String, bool, String);

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Categories ---

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name COLLATE NOCASE"
        ))?;
        let rows: Vec<CategoryRow> = stmt
            .query_map([], category_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(into_category).collect()
    }

    pub fn category(&self, id: Uuid) -> Result<Category> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                [id.to_string()],
                category_row,
            )
            .optional()?;
        row.map(into_category)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))
    }

    /// Case-insensitive lookup by name.
    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1 COLLATE NOCASE"),
                [name.trim()],
                category_row,
            )
            .optional()?;
        row.map(into_category).transpose()
    }

    pub fn require_category(&self, name: &str) -> Result<Category> {
        self.category_by_name(name)?
            .ok_or_else(|| StoreError::NotFound(format!("category '{}'", name.trim())))
    }

    pub fn add_category(&self, name: &str, no_repeat_days: u32) -> Result<Category> {
        let name = require_name(name, "category")?;
        check_window(no_repeat_days)?;
        let category = Category {
            id: Uuid::new_v4(),
            name: name.clone(),
            created_at: now_iso8601(),
            no_repeat_days,
        };
        self.conn
            .execute(
                "INSERT INTO categories (id, name, created_at, no_repeat_days) VALUES (?1, ?2, ?3, ?4)",
                params![
                    category.id.to_string(),
                    category.name,
                    category.created_at,
                    category.no_repeat_days,
                ],
            )
            .map_err(|e| StoreError::conflict_or(e, || format!("category '{name}' already exists")))?;
        tracing::debug!(category = %category.name, "added category");
        Ok(category)
    }

    pub fn rename_category(&self, id: Uuid, new_name: &str) -> Result<Category> {
        let name = require_name(new_name, "category")?;
        let rows = self
            .conn
            .execute(
                "UPDATE categories SET name = ?1 WHERE id = ?2",
                params![name, id.to_string()],
            )
            .map_err(|e| StoreError::conflict_or(e, || format!("category '{name}' already exists")))?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("category {id}")));
        }
        self.category(id)
    }

    /// Delete a category together with its options and picks.
    pub fn remove_category(&self, id: Uuid) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", [id.to_string()])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("category {id}")));
        }
        tracing::info!(%id, "removed category");
        Ok(())
    }

    pub fn set_no_repeat_days(&self, id: Uuid, days: u32) -> Result<()> {
        check_window(days)?;
        let rows = self.conn.execute(
            "UPDATE categories SET no_repeat_days = ?1 WHERE id = ?2",
            params![days, id.to_string()],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    // --- Options (catalog) ---

    pub fn list_options(&self, category_id: Uuid) -> Result<Vec<OptionItem>> {
        self.query_options(
            &format!("SELECT {OPTION_COLUMNS} FROM options WHERE category_id = ?1 ORDER BY rowid"),
            category_id,
        )
    }

    /// The catalog the engine draws from.
    pub fn enabled_options(&self, category_id: Uuid) -> Result<Vec<OptionItem>> {
        enabled_options_on(&self.conn, category_id)
    }

    fn query_options(&self, sql: &str, category_id: Uuid) -> Result<Vec<OptionItem>> {
        query_options_on(&self.conn, sql, category_id)
    }

    pub fn option(&self, id: OptionId) -> Result<Option<OptionItem>> {
        option_on(&self.conn, id)
    }

    pub fn option_by_name(&self, category_id: Uuid, name: &str) -> Result<Option<OptionItem>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {OPTION_COLUMNS} FROM options WHERE category_id = ?1 AND name = ?2 COLLATE NOCASE"
                ),
                params![category_id.to_string(), name.trim()],
                option_row,
            )
            .optional()?;
        row.map(into_option).transpose()
    }

    pub fn require_option(&self, category: &Category, name: &str) -> Result<OptionItem> {
        self.option_by_name(category.id, name)?.ok_or_else(|| {
            StoreError::NotFound(format!("option '{}' in '{}'", name.trim(), category.name))
        })
    }

    pub fn add_option(&self, category_id: Uuid, draft: &OptionDraft) -> Result<OptionItem> {
        let draft = draft
            .normalized()
            .ok_or_else(|| StoreError::InvalidData("option name is required".to_string()))?;
        // Surfaces NotFound before the foreign key does.
        self.category(category_id)?;

        let item = OptionItem {
            id: OptionId::new(),
            category_id,
            name: draft.name,
            notes: draft.notes,
            tags: draft.tags,
            is_enabled: true,
            created_at: now_iso8601(),
        };
        self.conn
            .execute(
                "INSERT INTO options (id, category_id, name, notes, tags, is_enabled, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.id.to_string(),
                    category_id.to_string(),
                    item.name,
                    item.notes,
                    encode_tags(&item.tags)?,
                    item.is_enabled,
                    item.created_at,
                ],
            )
            .map_err(|e| {
                StoreError::conflict_or(e, || format!("option '{}' already exists", item.name))
            })?;
        tracing::debug!(option = %item.name, "added option");
        Ok(item)
    }

    pub fn update_option(&self, id: OptionId, update: &OptionUpdate) -> Result<OptionItem> {
        let mut item = self
            .option(id)?
            .ok_or_else(|| StoreError::NotFound(format!("option {id}")))?;

        if let Some(name) = &update.name {
            item.name = require_name(name, "option")?;
        }
        if let Some(notes) = &update.notes {
            item.notes = normalize_notes(Some(notes));
        }
        if let Some(tags) = &update.tags {
            item.tags = normalize_tags(tags);
        }
        if let Some(category_id) = update.category_id {
            self.category(category_id)?;
            item.category_id = category_id;
        }

        self.conn
            .execute(
                "UPDATE options SET name = ?1, notes = ?2, tags = ?3, category_id = ?4 WHERE id = ?5",
                params![
                    item.name,
                    item.notes,
                    encode_tags(&item.tags)?,
                    item.category_id.to_string(),
                    id.to_string(),
                ],
            )
            .map_err(|e| {
                StoreError::conflict_or(e, || format!("option '{}' already exists", item.name))
            })?;
        Ok(item)
    }

    pub fn set_option_enabled(&self, id: OptionId, enabled: bool) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE options SET is_enabled = ?1 WHERE id = ?2",
            params![enabled, id.to_string()],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("option {id}")));
        }
        Ok(())
    }

    /// Delete an option. Past picks of it stay in history without an option.
    pub fn remove_option(&self, id: OptionId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM options WHERE id = ?1", [id.to_string()])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("option {id}")));
        }
        Ok(())
    }
}

pub(crate) fn enabled_options_on(conn: &Connection, category_id: Uuid) -> Result<Vec<OptionItem>> {
    query_options_on(
        conn,
        &format!(
            "SELECT {OPTION_COLUMNS} FROM options WHERE category_id = ?1 AND is_enabled = 1 ORDER BY rowid"
        ),
        category_id,
    )
}

pub(crate) fn option_on(conn: &Connection, id: OptionId) -> Result<Option<OptionItem>> {
    let row = conn
        .query_row(
            &format!("SELECT {OPTION_COLUMNS} FROM options WHERE id = ?1"),
            [id.to_string()],
            option_row,
        )
        .optional()?;
    row.map(into_option).transpose()
}

fn query_options_on(conn: &Connection, sql: &str, category_id: Uuid) -> Result<Vec<OptionItem>> {
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<OptionRow> = stmt
        .query_map([category_id.to_string()], option_row)?
        .collect::<std::result::Result<_, _>>()?;
    rows.into_iter().map(into_option).collect()
}

fn category_row(row: &Row<'_>) -> rusqlite::Result<CategoryRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_category((id, name, created_at, no_repeat_days): CategoryRow) -> Result<Category> {
    Ok(Category {
        id: parse_uuid(&id)?,
        name,
        created_at,
        no_repeat_days,
    })
}

fn option_row(row: &Row<'_>) -> rusqlite::Result<OptionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_option(
    (id, category_id, name, notes, tags, is_enabled, created_at): OptionRow,
) -> Result<OptionItem> {
    Ok(OptionItem {
        id: OptionId(parse_uuid(&id)?),
        category_id: parse_uuid(&category_id)?,
        name,
        notes,
        tags: decode_tags(&tags)?,
        is_enabled,
        created_at,
    })
}

fn require_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidData(format!("{what} name is required")));
    }
    Ok(trimmed.to_string())
}

fn check_window(days: u32) -> Result<()> {
    if days > MAX_NO_REPEAT_DAYS {
        return Err(StoreError::InvalidData(format!(
            "no-repeat window must be 0..={MAX_NO_REPEAT_DAYS} days, got {days}"
        )));
    }
    Ok(())
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| StoreError::InvalidData(format!("tags: {e}")))
}

fn decode_tags(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| StoreError::InvalidData(format!("invalid tags '{raw}': {e}")))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}

pub(crate) fn parse_day(s: &str) -> Result<Day> {
    s.parse()
        .map_err(|e| StoreError::InvalidData(format!("{e}")))
}
