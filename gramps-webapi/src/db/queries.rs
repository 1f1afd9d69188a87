//! Database query implementations.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::error::DbResult;
use crate::models::Researcher;

/// Parse a timestamp string flexibly from various formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Common SQLite datetime format: "YYYY-MM-DD HH:MM:SS", optionally fractional
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Queries for the metadata key/value table.
pub struct MetadataQueries;

impl MetadataQueries {
    /// Get a metadata value by key.
    pub fn get(conn: &Connection, key: &str) -> DbResult<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a metadata value.
    pub fn set(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Queries for the single-row researcher table.
pub struct ResearcherQueries;

impl ResearcherQueries {
    /// Get the researcher record, if one was stored.
    pub fn get(conn: &Connection) -> DbResult<Option<Researcher>> {
        let researcher = conn
            .query_row(
                r"SELECT name, address, locality, city, state, country, postal, phone, email
                  FROM researcher WHERE id = 1",
                [],
                Self::row_to_researcher,
            )
            .optional()?;
        Ok(researcher)
    }

    /// Store the researcher record, replacing any previous one.
    pub fn set(conn: &Connection, r: &Researcher) -> DbResult<()> {
        conn.execute(
            r"INSERT OR REPLACE INTO researcher
                (id, name, address, locality, city, state, country, postal, phone, email)
              VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                r.name,
                r.address,
                r.locality,
                r.city,
                r.state,
                r.country,
                r.postal,
                r.phone,
                r.email,
            ],
        )?;
        Ok(())
    }

    fn row_to_researcher(row: &rusqlite::Row<'_>) -> rusqlite::Result<Researcher> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };
        Ok(Researcher {
            name: text(0)?,
            address: text(1)?,
            locality: text(2)?,
            city: text(3)?,
            state: text(4)?,
            country: text(5)?,
            postal: text(6)?,
            phone: text(7)?,
            email: text(8)?,
        })
    }
}
