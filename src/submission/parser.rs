use aws_lambda_events::event::sns::SnsEvent;
use serde_json::Value;

use crate::error::IntakeError;
use crate::models::SubmissionRecord;

/// Turn an inbound payload into a submission.
///
/// Accepts an SNS envelope (`Records[0].Sns.Message` carries the notification
/// JSON) or the bare notification object.
pub fn from_payload(payload: Value) -> Result<SubmissionRecord, IntakeError> {
    if payload.get("Records").is_some() {
        from_sns_event(payload)
    } else {
        let submission: SubmissionRecord =
            serde_json::from_value(payload).map_err(IntakeError::Message)?;
        submission.validate()?;
        Ok(submission)
    }
}

pub fn from_sns_event(payload: Value) -> Result<SubmissionRecord, IntakeError> {
    let event: SnsEvent = serde_json::from_value(payload).map_err(IntakeError::Envelope)?;

    if event.records.len() > 1 {
        tracing::warn!(
            records = event.records.len(),
            "Envelope carries more than one record, only the first is processed"
        );
    }

    let record = event
        .records
        .into_iter()
        .next()
        .ok_or(IntakeError::EmptyEnvelope)?;

    parse_message(&record.sns.message)
}

/// Parse the notification JSON carried in an SNS message body.
pub fn parse_message(message: &str) -> Result<SubmissionRecord, IntakeError> {
    let submission: SubmissionRecord =
        serde_json::from_str(message).map_err(IntakeError::Message)?;
    submission.validate()?;
    Ok(submission)
}
