#![allow(dead_code)]

mod auth;
mod billing;
mod config;
mod dashboard;
mod db;
mod errors;
mod gateway;
mod handlers;
mod models;

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::dashboard::RevenueSources;
use crate::gateway::{AsaasAccount, ExternalSubscriptionSource, PaymentSource};
use crate::handlers::AppState;
use crate::models::PaymentSourceKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "trato_revenue=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(environment = ?config.environment, "Configuration loaded");

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url())
        .await?;
    tracing::info!("Connected to PostgreSQL");

    // Run migrations
    sqlx::raw_sql(include_str!("../migrations/001_initial_schema.sql"))
        .execute(&pool)
        .await?;
    tracing::info!("Database migrations applied");

    // Payment sources
    let trato = Arc::new(AsaasAccount::new(
        "trato",
        PaymentSourceKind::AsaasTrato,
        &config.gateway,
        &config.gateway.trato,
    ));
    let andrey = config.gateway.andrey.as_ref().map(|account| {
        Arc::new(AsaasAccount::new(
            "andrey",
            PaymentSourceKind::AsaasAndrey,
            &config.gateway,
            account,
        ))
    });
    if andrey.is_none() {
        tracing::warn!("ASAAS_ANDREY account not configured; its revenue will be reported as zero");
    }

    let mut accounts = HashMap::new();
    accounts.insert(trato.name().to_string(), trato.clone());
    if let Some(account) = &andrey {
        accounts.insert(account.name().to_string(), account.clone());
    }

    let sources = RevenueSources {
        trato: trato.clone(),
        andrey: andrey.map(|a| a as Arc<dyn PaymentSource>),
        external: Arc::new(ExternalSubscriptionSource::new(pool.clone())),
    };

    // Create shared state
    let state = AppState {
        pool: pool.clone(),
        jwt: Arc::new(JwtManager::new(&config.auth.jwt_secret)),
        environment: config.environment,
        sources,
        accounts: Arc::new(accounts),
    };

    let app = handlers::router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting revenue server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
