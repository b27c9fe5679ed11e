mod status_record;
mod submission;

pub use status_record::{MailStatus, StatusRecord};
pub use submission::SubmissionRecord;
