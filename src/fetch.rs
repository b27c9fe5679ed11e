use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};
use tokio::io::AsyncWriteExt;

use crate::config::FetchConfig;
use crate::error::DownloadError;

/// HTTP GET client that follows a bounded number of redirects by hand.
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, DownloadError> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            max_redirects: config.max_redirects,
        })
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Download `url` into `destination`. Returns the number of bytes written.
    ///
    /// Only a 200 response is written. A 302 is followed up to
    /// `max_redirects` hops; every other status, including the other 3xx
    /// codes, fails with the status code.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let mut current = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let mut hops = 0;

        loop {
            let resp = self.client.get(current.clone()).send().await?;
            let status = resp.status();

            if status == StatusCode::OK {
                let written = write_body(resp, destination).await?;
                tracing::info!(
                    path = %destination.display(),
                    bytes = written,
                    "Download completed"
                );
                return Ok(written);
            }

            if !is_redirect(status) {
                tracing::error!(url = %current, status = status.as_u16(), "Failed to download file");
                return Err(DownloadError::Status {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }

            if hops >= self.max_redirects {
                return Err(DownloadError::TooManyRedirects {
                    max: self.max_redirects,
                    status: status.as_u16(),
                });
            }

            let next = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|location| current.join(location).ok())
                .ok_or(DownloadError::MissingLocation {
                    status: status.as_u16(),
                })?;

            tracing::info!(from = %current, to = %next, "Redirecting");
            current = next;
            hops += 1;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    status == StatusCode::FOUND
}

async fn write_body(resp: reqwest::Response, destination: &Path) -> Result<u64, DownloadError> {
    let mut file = tokio::fs::File::create(destination).await?;

    let result = async {
        let mut written = 0u64;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok::<_, DownloadError>(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(destination).await {
            tracing::warn!(path = %destination.display(), "Failed to remove partial download: {e}");
        }
    }

    result
}
