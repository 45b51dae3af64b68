use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use logit_db::DbPool;
use logit_mail::{EmailConfig, EmailDispatcher, EmailSender, LogSender, SmtpSender};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logit_api::config::ServerConfig;
use logit_api::router::build_app_router;
use logit_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "logit_api=debug,logit_db=debug,logit_mail=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });
    let host: IpAddr = config.host.parse().unwrap_or_else(|e| {
        tracing::error!(host = %config.host, error = %e, "HOST is not an IP address");
        std::process::exit(1);
    });
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, app_base_url = %config.app_base_url, "Loaded server configuration");

    let pool = connect_database(&config.database_url).await;
    let mailer = EmailDispatcher::new(email_sender(config.email.as_ref()));

    let state = AppState {
        pool,
        config: Arc::new(config),
        mailer,
    };
    let app = build_app_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, probe and migrate. Any failure aborts startup.
async fn connect_database(url: &str) -> DbPool {
    let pool = logit_db::create_pool(url)
        .await
        .expect("Failed to connect to database");

    logit_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    logit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    pool
}

/// SMTP delivery when a relay is configured, otherwise emails are only logged.
fn email_sender(relay: Option<&EmailConfig>) -> Arc<dyn EmailSender> {
    match relay {
        Some(relay) => {
            let sender = SmtpSender::new(relay).unwrap_or_else(|e| {
                tracing::error!(smtp_host = %relay.host, error = %e, "Invalid SMTP configuration");
                std::process::exit(1);
            });
            tracing::info!(smtp_host = %relay.host, smtp_port = relay.port, "SMTP email delivery enabled");
            Arc::new(sender)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogSender)
        }
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
