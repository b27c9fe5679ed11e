pub mod dynamodb;
pub mod postgres;

use async_trait::async_trait;

use crate::error::RecordError;
use crate::models::StatusRecord;

/// Durable table of per-invocation status rows.
#[async_trait]
pub trait StatusStore: Send + Sync {
    fn id(&self) -> &str;

    /// Append one row. Rows are never updated or deleted.
    async fn put(&self, record: &StatusRecord) -> Result<(), RecordError>;
}
