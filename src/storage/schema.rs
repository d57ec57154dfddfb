//! SQL schema definitions as const strings.
//!
//! Contains the SQLite schema for the article and press release document store.

/// SQL to create the articles table.
///
/// `embedding` holds the passage embedding as a JSON array once seeding
/// has generated it.
pub const CREATE_ARTICLES: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    journalist_email TEXT NOT NULL,
    outlet_name TEXT NOT NULL,
    publish_date TEXT NOT NULL DEFAULT '',
    headline TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding TEXT,
    embedded_at TEXT,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create article indexes.
pub const CREATE_ARTICLE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_articles_journalist ON articles(journalist_email)
"#;

/// SQL to create the press releases table.
///
/// `newsroom_lower` is the Unicode-lowercased newsroom used for lookups;
/// SQLite's own `lower()` only folds ASCII.
pub const CREATE_PRESS_RELEASES: &str = r#"
CREATE TABLE IF NOT EXISTS press_releases (
    id TEXT PRIMARY KEY,
    newsroom TEXT NOT NULL,
    newsroom_lower TEXT NOT NULL,
    publish_date TEXT NOT NULL DEFAULT '',
    headline TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create press release indexes.
pub const CREATE_PRESS_RELEASE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_press_releases_newsroom ON press_releases(newsroom_lower)
"#;

/// Returns all migrations in order.
pub fn all_migrations() -> Vec<&'static str> {
    vec![
        CREATE_ARTICLES,
        CREATE_ARTICLE_INDEXES,
        CREATE_PRESS_RELEASES,
        CREATE_PRESS_RELEASE_INDEXES,
    ]
}
