//! Track metadata database
//!
//! SQLite via sqlx. One table, keyed by title; the now-playing object key
//! is correlated against it by stripping the audio suffix.

use crate::error::Result;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// One row of track metadata
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackInfo {
    pub artist: String,
    pub title: String,
    pub cover_url: String,
    pub mp3_url: String,
}

/// Open (creating if necessary) the metadata database and ensure the
/// schema exists
pub async fn init_db(database_path: &Path) -> Result<SqlitePool> {
    let url = format!("sqlite://{}?mode=rwc", database_path.display());
    let pool = SqlitePool::connect(&url).await?;
    create_schema(&pool).await?;
    info!("database ready at {}", database_path.display());
    Ok(pool)
}

/// Create tables if they do not exist
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_info (
            artist    TEXT NOT NULL,
            title     TEXT PRIMARY KEY,
            cover_url TEXT NOT NULL,
            mp3_url   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Look up one track's metadata by title
pub async fn get_track_by_title(pool: &SqlitePool, title: &str) -> Result<Option<TrackInfo>> {
    let track = sqlx::query_as::<_, TrackInfo>(
        "SELECT artist, title, cover_url, mp3_url FROM track_info WHERE title = ?",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn lookup_by_title() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO track_info (artist, title, cover_url, mp3_url) VALUES (?, ?, ?, ?)")
            .bind("Boards of Canada")
            .bind("Roygbiv")
            .bind("roygbiv.jpg")
            .bind("Roygbiv.mp3")
            .execute(&pool)
            .await
            .unwrap();

        let track = get_track_by_title(&pool, "Roygbiv").await.unwrap().unwrap();
        assert_eq!(track.artist, "Boards of Canada");
        assert_eq!(track.mp3_url, "Roygbiv.mp3");

        assert!(get_track_by_title(&pool, "missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();
    }
}
