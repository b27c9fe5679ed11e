//! Lambda runtime trigger.

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;

use crate::submission::{Pipeline, parser};

pub async fn run(pipeline: Pipeline) -> Result<(), Error> {
    let pipeline = Arc::new(pipeline);

    let func = service_fn(move |event: LambdaEvent<Value>| {
        let pipeline = pipeline.clone();
        async move { handle(&pipeline, event.payload, &event.context.env_config.log_stream).await }
    });

    lambda_runtime::run(func).await
}

/// Process one notification event.
///
/// Returns the log stream name on success and `None` once the failure notice
/// and status row have been attempted for a Fetch or Relay failure. That
/// failure is logged but not returned, so an asynchronous trigger does not
/// redeliver the event and notify the submitter twice. A payload that yields
/// no submission skips both and is returned as the invocation error.
pub async fn handle(
    pipeline: &Pipeline,
    payload: Value,
    log_stream: &str,
) -> Result<Option<String>, Error> {
    let submission = parser::from_payload(payload).inspect_err(|e| {
        tracing::error!("Rejected notification, no notice or status row written: {e}");
    })?;

    let report = pipeline.run(&submission).await;

    match report.failure {
        Some(e) => {
            tracing::warn!(
                stage = e.stage(),
                submission_id = %report.submission_id,
                "Invocation completed on the failure path: {e}"
            );
            Ok(None)
        }
        None => Ok(Some(log_stream.to_string())),
    }
}
