use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 2;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // For existing v1 databases CREATE TABLE IF NOT EXISTS is a no-op,
    // so missing columns are added with ALTER TABLE below.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL UNIQUE COLLATE NOCASE,
            created_at     TEXT NOT NULL,
            no_repeat_days INTEGER NOT NULL DEFAULT 3
        );

        CREATE TABLE IF NOT EXISTS options (
            id          TEXT PRIMARY KEY,
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            notes       TEXT,
            tags        TEXT NOT NULL DEFAULT '[]',
            is_enabled  INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS picks (
            id          TEXT PRIMARY KEY,
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            option_id   TEXT REFERENCES options(id) ON DELETE SET NULL,
            day         TEXT NOT NULL,
            picked_at   TEXT NOT NULL,
            source      TEXT NOT NULL DEFAULT 'auto',
            roll        INTEGER NOT NULL DEFAULT 0,
            reason      TEXT NOT NULL DEFAULT ''
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_option_name ON options(category_id, name COLLATE NOCASE);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_pick_category_day ON picks(category_id, day);
        CREATE INDEX IF NOT EXISTS idx_pick_option ON picks(option_id);
        ",
    )?;

    // Add the re-roll counter to v1 databases that lack it
    if conn.prepare("SELECT roll FROM picks LIMIT 0").is_err() {
        conn.execute_batch("ALTER TABLE picks ADD COLUMN roll INTEGER NOT NULL DEFAULT 0;")?;
        tracing::info!("added roll column to picks");
    }

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        for table in &["metadata", "categories", "options", "picks"] {
            let count: i64 = conn
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert!(count >= 0, "table {table} should exist");
        }
    }

    #[test]
    fn test_schema_version_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_idempotent_initialize() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_busy_timeout_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000, "busy_timeout should be 5000ms");
    }

    #[test]
    fn test_one_pick_per_category_day() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO categories (id, name, created_at) VALUES ('c1', 'Meal', 'now');
             INSERT INTO picks (id, category_id, day, picked_at) VALUES ('p1', 'c1', '2026-10-16', 'now');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO picks (id, category_id, day, picked_at) VALUES ('p2', 'c1', '2026-10-16', 'now')",
            [],
        );
        assert!(dup.is_err(), "second pick on the same day must be rejected");
    }

    #[test]
    fn test_upgrade_v1_adds_roll() {
        let conn = Connection::open_in_memory().unwrap();

        // Simulate v1 schema: picks without the roll column
        conn.execute_batch(
            "
            CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL);
            INSERT INTO metadata (key, value) VALUES ('schema_version', '1');

            CREATE TABLE categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                created_at TEXT NOT NULL,
                no_repeat_days INTEGER NOT NULL DEFAULT 3
            );
            CREATE TABLE picks (
                id TEXT PRIMARY KEY,
                category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                option_id TEXT,
                day TEXT NOT NULL,
                picked_at TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT 'auto',
                reason TEXT NOT NULL DEFAULT ''
            );

            INSERT INTO categories (id, name, created_at) VALUES ('c1', 'Meal', 'then');
            INSERT INTO picks (id, category_id, day, picked_at) VALUES ('p1', 'c1', '2026-01-01', 'then');
            ",
        )
        .unwrap();

        initialize(&conn).unwrap();

        let roll: i64 = conn
            .query_row("SELECT roll FROM picks WHERE id = 'p1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(roll, 0);
        assert_eq!(get_schema_version(&conn).unwrap(), Some(2));
    }
}
