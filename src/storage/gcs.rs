//! Google Cloud Storage relay target.
//!
//! Uploads use the JSON API simple-upload endpoint. Each upload exchanges a
//! freshly signed service-account assertion for an OAuth2 access token.

use std::path::Path;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use super::ObjectStore;
use crate::config::GcsConfig;
use crate::error::UploadError;
use crate::http::truncated_body;

const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file this client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GcsStore {
    client: reqwest::Client,
    bucket: String,
    api_base: String,
    credentials: ServiceAccountKey,
    signing_key: EncodingKey,
}

impl GcsStore {
    pub fn new(config: &GcsConfig) -> Result<Self, UploadError> {
        let signing_key = EncodingKey::from_rsa_pem(config.credentials.private_key.as_bytes())
            .map_err(|e| UploadError::Credentials(format!("private_key: {e}")))?;

        tracing::info!(
            project_id = %config.project_id,
            bucket = %config.bucket,
            client_email = %config.credentials.client_email,
            "Cloud Storage configured"
        );

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            bucket: config.bucket.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            signing_key,
        })
    }

    fn assertion(&self) -> Result<String, UploadError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.credentials.client_email,
            scope: STORAGE_SCOPE,
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.credentials.private_key_id.clone();

        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }

    async fn access_token(&self) -> Result<String, UploadError> {
        let assertion = self.assertion()?;

        let resp = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError::Token {
                status: status.as_u16(),
                body: truncated_body(resp).await,
            });
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }

    fn upload_url(&self, destination: &str) -> Result<Url, UploadError> {
        Url::parse_with_params(
            &format!("{}/upload/storage/v1/b/{}/o", self.api_base, self.bucket),
            &[("uploadType", "media"), ("name", destination)],
        )
        .map_err(|e| UploadError::Endpoint(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn id(&self) -> &str {
        "gcs"
    }

    async fn upload(&self, source: &Path, destination: &str) -> Result<(), UploadError> {
        tracing::info!(bucket = %self.bucket, "Uploading artifact");

        let url = self.upload_url(destination)?;
        let file = tokio::fs::File::open(source).await?;
        let length = file.metadata().await?.len();
        let token = self.access_token().await?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/zip")
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: truncated_body(resp).await,
            });
        }

        tracing::info!(
            "File {} uploaded to {}/{}",
            source.display(),
            self.bucket,
            destination
        );
        Ok(())
    }
}
