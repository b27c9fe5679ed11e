use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use uuid::Uuid;

use crate::db::StatusStore;
use crate::email::{Mailer, Notice};
use crate::error::{DownloadError, NotifyError, PipelineError, RecordError, UploadError};
use crate::fetch::Fetcher;
use crate::models::{MailStatus, StatusRecord, SubmissionRecord};
use crate::storage::ObjectStore;

/// Fetch, relay, notify and record one submission.
pub struct Pipeline {
    fetcher: Fetcher,
    store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
    status: Arc<dyn StatusStore>,
    scratch_dir: PathBuf,
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct Report {
    pub submission_id: String,
    pub mail_status: MailStatus,
    pub relay_path: Option<String>,
    pub failure: Option<PipelineError>,
    pub notify_error: Option<NotifyError>,
    pub record_error: Option<RecordError>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "status": self.mail_status,
            "submission_id": &self.submission_id,
            "relay_path": &self.relay_path,
            "error": self.failure.as_ref().map(|e| e.to_string()),
            "notified": self.notify_error.is_none(),
            "recorded": self.record_error.is_none(),
        })
    }
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
        status: Arc<dyn StatusStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            store,
            mailer,
            status,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Run every stage for `submission`.
    ///
    /// Notify and Record always run, with the failure variant when Fetch or
    /// Relay failed. Their errors are logged and reported, never escalated.
    #[tracing::instrument(
        skip(self, submission),
        fields(
            submission_id = %submission.submission_id,
            assignment_id = %submission.assignment_id,
        )
    )]
    pub async fn run(&self, submission: &SubmissionRecord) -> Report {
        tracing::info!("Start of submission pipeline");

        let (mail_status, relay_path, failure) = match self.fetch_and_relay(submission).await {
            Ok(path) => (MailStatus::Success, Some(path), None),
            Err(e) => {
                tracing::error!(stage = e.stage(), "Submission pipeline failed: {e}");
                (MailStatus::Fail, None, Some(e))
            }
        };

        let notify_error = self.notify(submission, relay_path.as_deref()).await.err();
        let record_error = self.record(submission, mail_status).await.err();

        tracing::info!(%mail_status, "End of submission pipeline");

        Report {
            submission_id: submission.submission_id.clone(),
            mail_status,
            relay_path,
            failure,
            notify_error,
            record_error,
        }
    }

    async fn fetch_and_relay(&self, submission: &SubmissionRecord) -> Result<String, PipelineError> {
        let artifact = self.fetch(submission).await?;
        let relayed = self.relay(&artifact, submission).await;

        if let Err(e) = tokio::fs::remove_file(&artifact).await {
            tracing::warn!(path = %artifact.display(), "Failed to remove artifact: {e}");
        }

        Ok(relayed?)
    }

    /// Download the submission into the scratch directory.
    pub async fn fetch(&self, submission: &SubmissionRecord) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let artifact = self
            .scratch_dir
            .join(submission.artifact_file_name(Uuid::now_v7()));

        self.fetcher
            .download(&submission.submission_url, &artifact)
            .await?;

        Ok(artifact)
    }

    /// Copy the artifact to object storage. Returns the relay path.
    pub async fn relay(
        &self,
        artifact: &Path,
        submission: &SubmissionRecord,
    ) -> Result<String, UploadError> {
        let destination = submission.relay_path();

        if let Err(e) = self.store.upload(artifact, &destination).await {
            tracing::error!(store = self.store.id(), "Error uploading file: {e}");
            return Err(e);
        }

        Ok(destination)
    }

    /// Email the submitter. A relay path selects the success wording.
    pub async fn notify(
        &self,
        submission: &SubmissionRecord,
        relay_path: Option<&str>,
    ) -> Result<(), NotifyError> {
        let notice = match relay_path {
            Some(path) => Notice::success(submission, path),
            None => Notice::failure(submission),
        };

        let result = match notice {
            Ok(notice) => self.mailer.send(&notice).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => tracing::info!(
                mailer = self.mailer.id(),
                "Email sent to {} for assignment {}",
                submission.submitter_email,
                submission.assignment_name
            ),
            Err(e) => tracing::error!(
                mailer = self.mailer.id(),
                "Failed to send email to {} for assignment {}: {e}",
                submission.submitter_email,
                submission.assignment_name
            ),
        }

        result
    }

    /// Append the status row for this invocation.
    pub async fn record(
        &self,
        submission: &SubmissionRecord,
        mail_status: MailStatus,
    ) -> Result<StatusRecord, RecordError> {
        let record = StatusRecord::new(submission, mail_status);

        match self.status.put(&record).await {
            Ok(()) => {
                tracing::info!(store = self.status.id(), %mail_status, "Status recorded");
                Ok(record)
            }
            Err(e) => {
                tracing::error!(store = self.status.id(), "Error while recording status: {e}");
                Err(e)
            }
        }
    }
}
