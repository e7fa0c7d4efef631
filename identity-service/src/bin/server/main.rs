use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use identity_service::config::Config;
use identity_service::identity::code::RandomCodeGenerator;
use identity_service::identity::confirmation::ConfirmationEngine;
use identity_service::identity::ports::EmailSender;
use identity_service::identity::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::telegram::bot::TelegramBot;
use identity_service::inbound::telegram::client::TelegramClient;
use identity_service::outbound::email::HttpEmailSender;
use identity_service::outbound::email::LogEmailSender;
use identity_service::repositories::PostgresApplicationRepository;
use identity_service::repositories::PostgresConfirmationRepository;
use identity_service::repositories::PostgresUserRepository;
use identity_service::telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    telemetry::init(config.app.env);

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        env = ?config.app.env,
        "Service starting"
    );

    tracing::info!(
        http_port = config.server.http_port,
        email_relay = config.email.relay_url.is_some(),
        telegram_enabled = config.telegram.enabled,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let email_sender: Arc<dyn EmailSender> = match &config.email.relay_url {
        Some(url) => Arc::new(HttpEmailSender::new(
            url.clone(),
            config.email.api_key.clone(),
            Duration::from_secs(config.email.relay_timeout_secs),
        )?),
        None => {
            tracing::warn!("No email relay configured; confirmation emails are only logged");
            Arc::new(LogEmailSender)
        }
    };

    let confirmations = ConfirmationEngine::new(
        Arc::new(PostgresConfirmationRepository::new(pg_pool.clone())),
        email_sender,
        Arc::new(RandomCodeGenerator::new()),
        config.email.sender.clone(),
    );

    let authenticator = Arc::new(Authenticator::new(config.token_ttl()));
    tracing::info!(
        token_ttl_minutes = authenticator.token_ttl().num_minutes(),
        "Session token issuer ready"
    );

    let auth_service = Arc::new(AuthService::new(
        Arc::new(PostgresUserRepository::new(pg_pool.clone())),
        Arc::new(PostgresApplicationRepository::new(pg_pool)),
        confirmations,
        authenticator,
    ));

    let bot_task = if config.telegram.enabled {
        let client = TelegramClient::new(
            &config.telegram.bot_token,
            Duration::from_secs(config.telegram.poll_timeout_secs),
        )?;
        let bot = TelegramBot::new(
            client,
            Arc::clone(&auth_service),
            config.telegram.poll_timeout_secs,
        );
        Some(tokio::spawn(bot.run()))
    } else {
        None
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = bot_task {
        task.abort();
        tracing::info!("Telegram bot stopped");
    }

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
