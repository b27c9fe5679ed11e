#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tempfile::TempDir;

use submission_relay::config::FetchConfig;
use submission_relay::db::StatusStore;
use submission_relay::email::{Mailer, Notice};
use submission_relay::error::{NotifyError, RecordError, UploadError};
use submission_relay::fetch::Fetcher;
use submission_relay::models::{StatusRecord, SubmissionRecord};
use submission_relay::storage::ObjectStore;
use submission_relay::submission::Pipeline;

pub const ZIP_BODY: &[u8] = b"PK\x03\x04\x14\x00\x00\x00submission-one\x00\xff\xfe";
pub const REDIRECTED_BODY: &[u8] = b"PK\x03\x04\x14\x00\x00\x00served-after-redirect";

/// Serve `app` on a random local port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

/// Chunks of `/slow.zip`, each sent after a pause.
pub const SLOW_CHUNKS: &[&[u8]] = &[b"PK\x03\x04", b"slow-", b"submission", b"-body"];

pub fn slow_zip_body() -> Vec<u8> {
    SLOW_CHUNKS.concat()
}

fn slow_body() -> Body {
    let chunks = stream::iter(SLOW_CHUNKS.iter().copied()).then(|chunk| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, std::io::Error>(Bytes::from_static(chunk))
    });
    Body::from_stream(chunks)
}

fn redirect(status: StatusCode, location: &'static str) -> Response {
    (status, [(header::LOCATION, location)]).into_response()
}

/// A file origin that submissions are downloaded from.
pub struct Origin {
    pub addr: SocketAddr,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_origin() -> Origin {
    let app = Router::new()
        .route("/ok.zip", get(|| async { ZIP_BODY }))
        .route("/other.zip", get(|| async { REDIRECTED_BODY }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
        .route("/no-content", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/redirect",
            get(|| async { redirect(StatusCode::FOUND, "/other.zip") }),
        )
        .route(
            "/redirect-missing",
            get(|| async { redirect(StatusCode::FOUND, "/missing") }),
        )
        .route(
            "/redirect-twice",
            get(|| async { redirect(StatusCode::FOUND, "/redirect") }),
        )
        .route("/redirect-no-location", get(|| async { StatusCode::FOUND }))
        .route(
            "/files/moved",
            get(|| async { redirect(StatusCode::FOUND, "../ok.zip") }),
        )
        .route(
            "/moved-permanently",
            get(|| async { redirect(StatusCode::MOVED_PERMANENTLY, "/ok.zip") }),
        )
        .route(
            "/see-other",
            get(|| async { redirect(StatusCode::SEE_OTHER, "/ok.zip") }),
        )
        .route(
            "/temporary-redirect",
            get(|| async { redirect(StatusCode::TEMPORARY_REDIRECT, "/ok.zip") }),
        )
        .route("/slow.zip", get(|| async { slow_body() }));

    Origin {
        addr: spawn(app).await,
    }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn submission(url: &str) -> SubmissionRecord {
    SubmissionRecord {
        assignment_id: "A1".to_string(),
        assignment_name: "HW1".to_string(),
        submission_id: "S1".to_string(),
        submission_url: url.to_string(),
        submitter_email: "u@x.com".to_string(),
    }
}

pub fn notification(url: &str) -> Value {
    json!({
        "assignmentId": "A1",
        "assignmentName": "HW1",
        "submissionId": "S1",
        "submissionUrl": url,
        "emailId": "u@x.com",
    })
}

/// An SNS event as Lambda delivers it, carrying `message` as the body.
pub fn sns_event(message: &str) -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "EventVersion": "1.0",
            "EventSubscriptionArn": "arn:aws:sns:us-east-1:123456789012:submissions:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55",
            "Sns": {
                "Type": "Notification",
                "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
                "TopicArn": "arn:aws:sns:us-east-1:123456789012:submissions",
                "Subject": null,
                "Message": message,
                "Timestamp": "2026-10-17T12:00:00.000Z",
                "SignatureVersion": "1",
                "Signature": "tcc6faL2yUC6dgZdmrwh1Y4cGa/ebXEkAi6RibDsvpi+tE/1+82j...65r==",
                "SigningCertUrl": "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-ac565b8b1a6c5d002d285f9598aa1d9b.pem",
                "UnsubscribeUrl": "https://sns.us-east-1.amazonaws.com/?Action=Unsubscribe&SubscriptionArn=arn:aws:sns:us-east-1:123456789012:submissions:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55",
                "MessageAttributes": {}
            }
        }]
    })
}

// ── Recording backends ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingStore {
    pub fail: bool,
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingStore {
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    fn id(&self) -> &str {
        "recording"
    }

    async fn upload(&self, source: &Path, destination: &str) -> Result<(), UploadError> {
        if self.fail {
            return Err(UploadError::Status {
                status: 503,
                body: "storage unavailable".to_string(),
            });
        }
        let bytes = tokio::fs::read(source).await?;
        self.uploads
            .lock()
            .unwrap()
            .push((destination.to_string(), bytes));
        Ok(())
    }
}

/// Records every send attempt, including failed ones.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: bool,
    pub attempts: Mutex<Vec<Notice>>,
}

impl RecordingMailer {
    pub fn attempts(&self) -> Vec<Notice> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn id(&self) -> &str {
        "recording"
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(notice.clone());
        if self.fail {
            return Err(NotifyError::Provider {
                status: 401,
                body: "Forbidden".to_string(),
            });
        }
        Ok(())
    }
}

/// Records every put attempt, including failed ones.
#[derive(Default)]
pub struct RecordingStatusStore {
    pub fail: bool,
    pub attempts: Mutex<Vec<StatusRecord>>,
}

impl RecordingStatusStore {
    pub fn attempts(&self) -> Vec<StatusRecord> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusStore for RecordingStatusStore {
    fn id(&self) -> &str {
        "recording"
    }

    async fn put(&self, record: &StatusRecord) -> Result<(), RecordError> {
        self.attempts.lock().unwrap().push(record.clone());
        if self.fail {
            return Err(RecordError::DynamoDb(
                "ResourceNotFoundException: table not found".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Pipeline harness ────────────────────────────────────────────

#[derive(Default, Clone, Copy)]
pub struct Faults {
    pub store: bool,
    pub mailer: bool,
    pub status: bool,
}

pub struct Harness {
    pub pipeline: Pipeline,
    pub store: Arc<RecordingStore>,
    pub mailer: Arc<RecordingMailer>,
    pub status: Arc<RecordingStatusStore>,
    pub scratch: TempDir,
}

impl Harness {
    /// Names of files left in the scratch directory.
    pub fn scratch_files(&self) -> Vec<String> {
        std::fs::read_dir(self.scratch.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

pub fn harness(faults: Faults) -> Harness {
    let store = Arc::new(RecordingStore {
        fail: faults.store,
        ..Default::default()
    });
    let mailer = Arc::new(RecordingMailer {
        fail: faults.mailer,
        ..Default::default()
    });
    let status = Arc::new(RecordingStatusStore {
        fail: faults.status,
        ..Default::default()
    });
    let scratch = tempfile::tempdir().expect("Failed to create scratch dir");

    let fetcher = Fetcher::new(&FetchConfig::default()).expect("Failed to build fetcher");
    let pipeline = Pipeline::new(
        fetcher,
        store.clone(),
        mailer.clone(),
        status.clone(),
        scratch.path(),
    );

    Harness {
        pipeline,
        store,
        mailer,
        status,
        scratch,
    }
}
