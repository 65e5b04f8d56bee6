//! Pustaka client - Library Management System
//!
//! Signs in against the remote API and prints the dashboard of the
//! signed-in role.

use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use pustaka_client::{
    config::LoggingConfig,
    services::{
        dashboard::{AdminDashboard, UserDashboard},
        RouteTree,
    },
    AppConfig, AppState,
};

/// Install the tracing subscriber; the guard must live as long as the process.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pustaka_client={}", config.level).into());

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pustaka-client.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = if config.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _guard = init_tracing(&config.logging);

    tracing::info!("Starting Pustaka client v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("API at {}", config.api.base_url);

    let state = AppState::new(config)?;
    let services = state.services.clone();
    let session_config = &state.config.session;

    let token = match (&session_config.token, &session_config.username, &session_config.password) {
        (Some(token), _, _) if !token.trim().is_empty() => token.clone(),
        (_, Some(username), Some(password)) => services.repository.users.login(username, password).await?.token,
        _ => anyhow::bail!("No session: set PUSTAKA_TOKEN or PUSTAKA_SESSION__USERNAME and PUSTAKA_SESSION__PASSWORD"),
    };

    let now = Utc::now();
    let session = services.session.sign_in(&token, now)?;
    let ctx = session.context();

    let result = match services.session.route(now) {
        RouteTree::SignIn => anyhow::bail!("Session is not valid"),
        RouteTree::Admin => AdminDashboard::load(&services.repository, &ctx, now)
            .await
            .map(|dashboard| println!("{}", dashboard)),
        RouteTree::User => {
            let user_id = match session.user_id {
                Some(id) => Ok(id),
                None => services.repository.users.me(&ctx).await.map(|me| me.id),
            };
            match user_id {
                Ok(user_id) => UserDashboard::load(&services.repository, &services.notices, &ctx, user_id, now)
                    .await
                    .and_then(|dashboard| {
                        println!("{}", dashboard);
                        match dashboard.notice.as_ref().filter(|n| n.unread) {
                            Some(notice) => services.notices.mark_read(notice),
                            None => Ok(()),
                        }
                    }),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(err) = result {
        let notice = services.session.handle_error(&err);
        eprintln!("{}", notice);
        std::process::exit(1);
    }

    Ok(())
}
