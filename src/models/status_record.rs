use serde::{Deserialize, Serialize};

use super::SubmissionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailStatus {
    Success,
    Fail,
}

impl MailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailStatus::Success => "success",
            MailStatus::Fail => "fail",
        }
    }
}

impl std::fmt::Display for MailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit row written once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub submission_id: String,
    pub assignment_id: String,
    pub submission_url: String,
    pub email_id: String,
    /// Ingestion time in Unix epoch milliseconds.
    pub timestamp: i64,
    pub mail_status: MailStatus,
}

impl StatusRecord {
    pub fn new(submission: &SubmissionRecord, mail_status: MailStatus) -> Self {
        Self {
            submission_id: submission.submission_id.clone(),
            assignment_id: submission.assignment_id.clone(),
            submission_url: submission.submission_url.clone(),
            email_id: submission.submitter_email.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            mail_status,
        }
    }
}
