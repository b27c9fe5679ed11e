use askama::Template;

use crate::models::SubmissionRecord;

#[derive(Template)]
#[template(path = "email/submission_success.html")]
struct SubmissionSuccess<'a> {
    assignment_name: &'a str,
    assignment_id: &'a str,
    submission_id: &'a str,
    relay_path: &'a str,
}

#[derive(Template)]
#[template(path = "email/submission_failed.html")]
struct SubmissionFailed<'a> {
    assignment_name: &'a str,
    assignment_id: &'a str,
    submission_id: &'a str,
}

pub fn render_success(submission: &SubmissionRecord, relay_path: &str) -> askama::Result<String> {
    SubmissionSuccess {
        assignment_name: &submission.assignment_name,
        assignment_id: &submission.assignment_id,
        submission_id: &submission.submission_id,
        relay_path,
    }
    .render()
}

pub fn render_failure(submission: &SubmissionRecord) -> askama::Result<String> {
    SubmissionFailed {
        assignment_name: &submission.assignment_name,
        assignment_id: &submission.assignment_id,
        submission_id: &submission.submission_id,
    }
    .render()
}
