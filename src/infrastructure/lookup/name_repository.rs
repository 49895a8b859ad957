//! Postgres-backed origin for name records

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::domain::lookup::{Gender, INameRepository, LookupError, NameRecord};

pub struct SqlxNameRepository {
    pool: Arc<PgPool>,
}

impl SqlxNameRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Result<NameRecord, LookupError> {
        let storage_err = |e: sqlx::Error| LookupError::Storage {
            message: e.to_string(),
        };

        let gender_str: String = row.try_get("gender").map_err(storage_err)?;
        let gender: Gender = gender_str
            .parse()
            .map_err(|message: String| LookupError::Storage { message })?;

        Ok(NameRecord {
            name: row.try_get("name").map_err(storage_err)?,
            gender,
            english_name: row.try_get("english_name").map_err(storage_err)?,
            popularity: row.try_get("popularity").map_err(storage_err)?,
        })
    }
}

#[async_trait]
impl INameRepository for SqlxNameRepository {
    async fn find(&self, name: &str) -> Result<Option<NameRecord>, LookupError> {
        let row = sqlx::query(
            r#"
            SELECT name, gender, english_name, popularity
            FROM names
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query name record");
            LookupError::Storage {
                message: e.to_string(),
            }
        })?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_top(&self, n: u32) -> Result<Vec<NameRecord>, LookupError> {
        let rows = sqlx::query(
            r#"
            SELECT name, gender, english_name, popularity
            FROM names
            ORDER BY popularity DESC, name ASC
            LIMIT $1
            "#,
        )
        .bind(n as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query top name records");
            LookupError::Storage {
                message: e.to_string(),
            }
        })?;

        rows.iter().map(Self::map_row).collect()
    }
}
