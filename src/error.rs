/// Startup errors: anything that stops the function from building its pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch client error: {0}")]
    Fetch(#[from] DownloadError),

    #[error("Storage client error: {0}")]
    Storage(#[from] UploadError),

    #[error("Mail client error: {0}")]
    Mail(#[from] NotifyError),

    #[error("Status store error: {0}")]
    Status(#[from] RecordError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, message: impl std::fmt::Display) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// The inbound payload could not be turned into a submission.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid notification envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Notification envelope contains no records")]
    EmptyEnvelope,

    #[error("Invalid notification message: {0}")]
    Message(#[source] serde_json::Error),

    #[error("Notification field {0} is empty")]
    EmptyField(&'static str),

    #[error("Notification field {field} is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Failed to download file. Status code: {status} ({url})")]
    Status { status: u16, url: String },

    #[error("Failed to download file. Redirect limit of {max} exceeded at status {status}")]
    TooManyRedirects { max: usize, status: u16 },

    #[error("Failed to download file. Redirect status {status} without a usable Location")]
    MissingLocation { status: u16 },

    #[error("Invalid download URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Error during download: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to write downloaded file: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// HTTP status code of the response that ended the download, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DownloadError::Status { status, .. }
            | DownloadError::TooManyRedirects { status, .. }
            | DownloadError::MissingLocation { status } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid storage credentials: {0}")]
    Credentials(String),

    #[error("Invalid storage endpoint: {0}")]
    Endpoint(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token exchange failed with status {status}: {body}")]
    Token { status: u16, body: String },

    #[error("Upload failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to render email: {0}")]
    Render(#[from] askama::Error),

    #[error("Mail provider rejected message with status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A failure of the main pipeline (Fetch or Relay).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Download(_) => "fetch",
            PipelineError::Upload(_) => "relay",
        }
    }
}
