pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod models;
pub mod routes;
pub mod email;
pub mod fetch;
mod http;
pub mod lambda;
pub mod storage;
pub mod submission;

use std::sync::Arc;

use aws_config::BehaviorVersion;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, MailTransport, StatusStoreConfig};
use crate::db::StatusStore;
use crate::db::dynamodb::DynamoStatusStore;
use crate::db::postgres::PgStatusStore;
use crate::email::Mailer;
use crate::email::mailgun::MailgunMailer;
use crate::email::smtp::SmtpMailer;
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::state::{AppState, SharedState};
use crate::storage::ObjectStore;
use crate::storage::gcs::GcsStore;
use crate::submission::Pipeline;

/// Build the pipeline and every backend client it needs from `config`.
pub async fn build_pipeline(config: &Config) -> Result<Pipeline, Error> {
    let fetcher = Fetcher::new(&config.fetch)?;

    let store: Arc<dyn ObjectStore> = Arc::new(GcsStore::new(&config.storage)?);

    let mailer: Arc<dyn Mailer> = match &config.mail.transport {
        MailTransport::Mailgun(mailgun) => {
            Arc::new(MailgunMailer::new(mailgun, &config.mail.from)?)
        }
        MailTransport::Smtp(smtp) => Arc::new(SmtpMailer::new(smtp, &config.mail.from)?),
    };

    let status: Arc<dyn StatusStore> = match &config.status_store {
        StatusStoreConfig::DynamoDb { table } => {
            let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
            Arc::new(DynamoStatusStore::new(
                aws_sdk_dynamodb::Client::new(&aws),
                table.clone(),
            ))
        }
        StatusStoreConfig::Postgres { database_url } => {
            Arc::new(PgStatusStore::connect(database_url).await?)
        }
    };

    tracing::info!(
        store = store.id(),
        mailer = mailer.id(),
        status_store = status.id(),
        max_redirects = fetcher.max_redirects(),
        "Pipeline configured"
    );

    Ok(Pipeline::new(
        fetcher,
        store,
        mailer,
        status,
        config.scratch_dir.clone(),
    ))
}

/// Router for the local HTTP trigger.
pub fn build_app(pipeline: Pipeline, max_body_size: usize) -> Router {
    let state: SharedState = Arc::new(AppState { pipeline });

    Router::new()
        .merge(routes::ingest_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
