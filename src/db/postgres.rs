use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::StatusStore;
use crate::error::RecordError;
use crate::models::StatusRecord;

pub struct PgStatusStore {
    pool: PgPool,
}

impl PgStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a single-connection pool and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, RecordError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Status table migrations applied");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    fn id(&self) -> &str {
        "postgres"
    }

    async fn put(&self, record: &StatusRecord) -> Result<(), RecordError> {
        sqlx::query(
            "INSERT INTO submission_status
                (submission_id, assignment_id, submission_url, email_id, \"timestamp\", mail_status)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.submission_id)
        .bind(&record.assignment_id)
        .bind(&record.submission_url)
        .bind(&record.email_id)
        .bind(record.timestamp)
        .bind(record.mail_status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
