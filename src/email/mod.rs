pub mod mailgun;
pub mod smtp;
pub mod templates;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::SubmissionRecord;

pub const FAILURE_SUBJECT: &str = "Submission Failed";

/// One outgoing HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Notice {
    pub fn success(submission: &SubmissionRecord, relay_path: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            to: submission.submitter_email.clone(),
            subject: submission.assignment_name.clone(),
            html: templates::render_success(submission, relay_path)?,
        })
    }

    pub fn failure(submission: &SubmissionRecord) -> Result<Self, NotifyError> {
        Ok(Self {
            to: submission.submitter_email.clone(),
            subject: FAILURE_SUBJECT.to_string(),
            html: templates::render_failure(submission)?,
        })
    }
}

/// Transactional mail provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn id(&self) -> &str;

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}
