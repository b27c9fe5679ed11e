use std::net::SocketAddr;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use submission_relay::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    let on_lambda = std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    if on_lambda {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .without_time()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting submission relay");

    let pipeline = submission_relay::build_pipeline(&config).await?;

    if on_lambda {
        return submission_relay::lambda::run(pipeline).await;
    }

    let addr = SocketAddr::new(config.host, config.port);
    let app = submission_relay::build_app(pipeline, config.max_body_size);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Local trigger listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
