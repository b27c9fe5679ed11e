use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IntakeError;

/// One submission event, as announced by the notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub assignment_id: String,
    pub assignment_name: String,
    pub submission_id: String,
    pub submission_url: String,
    #[serde(rename = "emailId")]
    pub submitter_email: String,
}

impl SubmissionRecord {
    /// Object storage key the artifact is relayed to.
    pub fn relay_path(&self) -> String {
        format!(
            "/uploads/{}/{}/{}.zip",
            self.submitter_email, self.assignment_id, self.submission_id
        )
    }

    /// File name of the transient artifact inside the scratch directory.
    /// `run_id` keeps concurrent runs of the same submission apart.
    pub fn artifact_file_name(&self, run_id: Uuid) -> String {
        format!("{}-{}.zip", self.submission_id, run_id)
    }

    pub fn validate(&self) -> Result<(), IntakeError> {
        let fields = [
            ("assignmentId", &self.assignment_id),
            ("assignmentName", &self.assignment_name),
            ("submissionId", &self.submission_id),
            ("submissionUrl", &self.submission_url),
            ("emailId", &self.submitter_email),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(IntakeError::EmptyField(name));
            }
        }

        // The submission id names a file in the scratch directory.
        let id = self.submission_id.as_str();
        if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
            return Err(IntakeError::InvalidField {
                field: "submissionId",
                reason: "must be a single path component",
            });
        }

        Ok(())
    }
}
