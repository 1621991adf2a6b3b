//! SQLite schema definition

/// SQL schema for the posts database
pub const SCHEMA_SQL: &str = r#"
-- Posts: one row per stored document
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id_post INTEGER,
    texte TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'Unknown',
    label TEXT NOT NULL DEFAULT 'Unknown',
    language TEXT,
    sentiment TEXT,
    sentiment_scores TEXT,
    sentiment_tokens TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_language ON posts(language);
CREATE INDEX IF NOT EXISTS idx_posts_sentiment ON posts(sentiment);
"#;
