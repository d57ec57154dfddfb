//! Article database queries.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result};

use crate::domain::{Article, ArticleId, EmbeddingVector};

const SELECT_COLUMNS: &str = "SELECT id, journalist_email, outlet_name, publish_date, headline, text,
        embedding, embedded_at
 FROM articles";

/// Inserts an article, replacing any existing row with the same ID.
///
/// A stored embedding is kept unless the new article carries one.
pub fn upsert(conn: &Connection, article: &Article) -> Result<()> {
    let embedding = article
        .embedding
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO articles (id, journalist_email, outlet_name, publish_date, headline, text,
                               embedding, embedded_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
             journalist_email = ?2,
             outlet_name = ?3,
             publish_date = ?4,
             headline = ?5,
             text = ?6,
             embedding = COALESCE(?7, embedding),
             embedded_at = COALESCE(?8, embedded_at)",
        params![
            article.id.0,
            article.journalist_email,
            article.outlet_name,
            article.publish_date,
            article.headline,
            article.text,
            embedding,
            article.embedded_at.map(|dt| dt.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Gets all articles in insertion order.
pub fn get_all(conn: &Connection) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))?;
    let articles = stmt.query_map([], row_to_article)?;
    articles.collect()
}

/// Gets articles that have no stored embedding yet.
pub fn get_without_embedding(conn: &Connection) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE embedding IS NULL ORDER BY rowid",
        SELECT_COLUMNS
    ))?;
    let articles = stmt.query_map([], row_to_article)?;
    articles.collect()
}

/// Stores the passage embedding for an article.
///
/// Returns the number of rows updated (0 if the article does not exist).
pub fn set_embedding(
    conn: &Connection,
    id: &ArticleId,
    embedding: &EmbeddingVector,
    embedded_at: DateTime<Utc>,
) -> Result<usize> {
    let json = serde_json::to_string(embedding)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "UPDATE articles SET embedding = ?1, embedded_at = ?2 WHERE id = ?3",
        params![json, embedded_at.to_rfc3339(), id.0],
    )
}

fn row_to_article(row: &rusqlite::Row) -> Result<Article> {
    let embedding: Option<String> = row.get(6)?;
    let embedding = embedding
        .map(|json| serde_json::from_str::<EmbeddingVector>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    let embedded_at: Option<String> = row.get(7)?;
    let embedded_at = embedded_at
        .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Article {
        id: ArticleId(row.get(0)?),
        journalist_email: row.get(1)?,
        outlet_name: row.get(2)?,
        publish_date: row.get(3)?,
        headline: row.get(4)?,
        text: row.get(5)?,
        embedding,
        embedded_at,
    })
}
