pub mod gcs;

use std::path::Path;

use async_trait::async_trait;

use crate::error::UploadError;

/// Durable object storage the transient artifact is relayed into.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn id(&self) -> &str;

    /// Copy the file at `source` to the object named `destination`.
    async fn upload(&self, source: &Path, destination: &str) -> Result<(), UploadError>;
}
