use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

use crate::db::models::DbImage;
use crate::db::schema::SQLITE_INIT;
use crate::error::ImageError;

/// The `images` table behind a shared connection pool.
///
/// Every statement binds its values; no SQL is built from user input.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    pool: SqlitePool,
}

impl MetadataStore {
    /// Opens (creating if missing) the database and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self, ImageError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::from_pool(pool).await?;
        info!("metadata store initialized");
        Ok(store)
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, ImageError> {
        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn insert(&self, url: &str, description: &str) -> Result<i64, ImageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO images (url, description)
        VALUES (?, ?)
        RETURNING id
        "#,
        )
        .bind(url)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, "image row inserted");
        Ok(id)
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Option<DbImage>, ImageError> {
        let row = sqlx::query_as::<_, DbImage>(
            r#"
        SELECT id, url, description
        FROM images
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// One page of rows in ascending id order.
    pub async fn select_page(&self, limit: i64, offset: i64) -> Result<Vec<DbImage>, ImageError> {
        let rows = sqlx::query_as::<_, DbImage>(
            r#"
        SELECT id, url, description
        FROM images
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_all(&self) -> Result<i64, ImageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update_by_id(
        &self,
        id: i64,
        url: &str,
        description: &str,
    ) -> Result<(), ImageError> {
        let res = sqlx::query(
            r#"
        UPDATE images
        SET url = ?, description = ?
        WHERE id = ?
        "#,
        )
        .bind(url)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "image row updated");
        if affected == 0 {
            return Err(ImageError::NotFound(id));
        }
        Ok(())
    }

    /// Changes only the description, leaving the url to whoever owns it.
    pub async fn update_description(&self, id: i64, description: &str) -> Result<(), ImageError> {
        let res = sqlx::query("UPDATE images SET description = ? WHERE id = ?")
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "image description updated");
        if affected == 0 {
            return Err(ImageError::NotFound(id));
        }
        Ok(())
    }

    /// Repoints the row only while it still references `expected_url`.
    ///
    /// Returns `false` when the row is gone or another writer changed its url first.
    pub async fn update_if_url(
        &self,
        id: i64,
        expected_url: &str,
        url: &str,
        description: &str,
    ) -> Result<bool, ImageError> {
        let res = sqlx::query(
            r#"
        UPDATE images
        SET url = ?, description = ?
        WHERE id = ? AND url = ?
        "#,
        )
        .bind(url)
        .bind(description)
        .bind(id)
        .bind(expected_url)
        .execute(&self.pool)
        .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "image row repointed");
        Ok(affected > 0)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), ImageError> {
        let res = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "image row deleted");
        if affected == 0 {
            return Err(ImageError::NotFound(id));
        }
        Ok(())
    }

    /// Closes the pool; later queries fail with a database error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), ImageError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
