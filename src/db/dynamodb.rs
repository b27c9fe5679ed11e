use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;

use super::StatusStore;
use crate::error::RecordError;
use crate::models::StatusRecord;

pub struct DynamoStatusStore {
    client: Client,
    table: String,
}

impl DynamoStatusStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl StatusStore for DynamoStatusStore {
    fn id(&self) -> &str {
        "dynamodb"
    }

    #[tracing::instrument(skip(self, record), fields(table = %self.table, submission_id = %record.submission_id))]
    async fn put(&self, record: &StatusRecord) -> Result<(), RecordError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("submission_id", AttributeValue::S(record.submission_id.clone()))
            .item("assignment_id", AttributeValue::S(record.assignment_id.clone()))
            .item("submission_url", AttributeValue::S(record.submission_url.clone()))
            .item("email_id", AttributeValue::S(record.email_id.clone()))
            .item("timestamp", AttributeValue::N(record.timestamp.to_string()))
            .item("mail_status", AttributeValue::S(record.mail_status.as_str().to_string()))
            .send()
            .await
            .map_err(|e| RecordError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
