//! Press release database queries.

use rusqlite::{params, Connection, Result};

use crate::domain::{PressRelease, PressReleaseId};

/// Maximum number of press releases returned by a newsroom lookup.
pub const NEWSROOM_MATCH_LIMIT: usize = 10;

/// Inserts a press release, replacing any existing row with the same ID.
///
/// `newsroom_lower` is folded in Rust so lookups ignore case beyond ASCII.
pub fn upsert(conn: &Connection, release: &PressRelease) -> Result<()> {
    conn.execute(
        "INSERT INTO press_releases
             (id, newsroom, newsroom_lower, publish_date, headline, text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
             newsroom = ?2,
             newsroom_lower = ?3,
             publish_date = ?4,
             headline = ?5,
             text = ?6",
        params![
            release.id.0,
            release.newsroom,
            release.newsroom.to_lowercase(),
            release.publish_date,
            release.headline,
            release.text,
        ],
    )?;
    Ok(())
}

/// Finds press releases whose newsroom contains `filter`, ignoring case.
///
/// Both sides are lowercased with Unicode rules and the filter is matched
/// literally. Results come back in insertion order,
/// capped at `limit`.
pub fn find_by_newsroom(
    conn: &Connection,
    filter: &str,
    limit: usize,
) -> Result<Vec<PressRelease>> {
    let mut stmt = conn.prepare(
        "SELECT id, newsroom, publish_date, headline, text
         FROM press_releases
         WHERE instr(newsroom_lower, ?1) > 0
         ORDER BY rowid
         LIMIT ?2",
    )?;

    let releases = stmt.query_map(
        params![filter.to_lowercase(), limit as i64],
        row_to_press_release,
    )?;
    releases.collect()
}

/// Lists the distinct newsroom names, sorted.
pub fn list_newsrooms(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT newsroom FROM press_releases ORDER BY newsroom")?;
    let newsrooms = stmt.query_map([], |row| row.get(0))?;
    newsrooms.collect()
}

fn row_to_press_release(row: &rusqlite::Row) -> Result<PressRelease> {
    Ok(PressRelease {
        id: PressReleaseId(row.get(0)?),
        newsroom: row.get(1)?,
        publish_date: row.get(2)?,
        headline: row.get(3)?,
        text: row.get(4)?,
    })
}
