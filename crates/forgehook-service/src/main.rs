//! # Forgehook Service
//!
//! Binary entry point for the webhook dispatch service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes structured logging
//! - Wires the trigger layer's collaborators
//! - Subscribes the dispatch service to the event bus
//! - Runs until shutdown, then drains in-flight work

mod config;

use crate::config::ServiceConfig;
use forgehook_core::adapters::{
    InMemoryGitAdapter, InMemoryPrincipalStore, InMemoryPullReqStore, InMemoryRepositoryStore,
};
use forgehook_core::url::BaseUrlProvider;
use forgehook_core::InMemoryEventBus;
use forgehook_dispatch::{DispatchService, LoggingWebhookExecutor, TriggerService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgehook_service=info,forgehook_dispatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Forgehook dispatch service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/forgehook/service.yaml           — system-wide defaults
    //  2. ./config/service.yaml                 — deployment-local override
    //  3. Path given by FORGEHOOK_CONFIG_FILE   — operator-specified file
    //  4. Environment variables prefixed FORGEHOOK__ (double-underscore
    //     separator), e.g. FORGEHOOK__DISPATCH__CONCURRENCY=8
    //
    // All fields carry serde defaults, so absent files or an entirely
    // unconfigured environment produces a valid configuration. A malformed
    // file or an environment variable that cannot be coerced to the correct
    // type IS a hard error because it indicates deliberate-but-broken
    // operator configuration.
    // -------------------------------------------------------------------------
    let mut config_builder = ::config::Config::builder()
        .add_source(
            ::config::File::with_name("/etc/forgehook/service")
                .required(false)
                .format(::config::FileFormat::Yaml),
        )
        .add_source(
            ::config::File::with_name("config/service")
                .required(false)
                .format(::config::FileFormat::Yaml),
        );

    if let Ok(explicit_path) = std::env::var("FORGEHOOK_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                ::config::File::with_name(&explicit_path)
                    .required(true)
                    .format(::config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let raw_config = match config_builder
        .add_source(::config::Environment::with_prefix("FORGEHOOK").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match raw_config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Wire collaborators
    //
    // The in-memory adapters stand in for the production stores and git
    // backend; deployments embedding this crate inject their own
    // implementations of the same traits. Outbound delivery runs elsewhere,
    // so the executor only logs the handoff.
    // -------------------------------------------------------------------------
    let url_provider = match BaseUrlProvider::new(&service_config.base_url) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Configured base_url is not usable; aborting");
            std::process::exit(3);
        }
    };

    let triggers = Arc::new(TriggerService::new(
        Arc::new(InMemoryPrincipalStore::new()),
        Arc::new(InMemoryRepositoryStore::new()),
        Arc::new(InMemoryPullReqStore::new()),
        Arc::new(InMemoryGitAdapter::new()),
        Arc::new(url_provider),
        Arc::new(LoggingWebhookExecutor),
    ));

    let bus = InMemoryEventBus::with_options(
        service_config.dispatch.concurrency,
        service_config.dispatch.redelivery_policy(),
    );

    let shutdown = CancellationToken::new();
    let dispatch = match DispatchService::new(&bus, triggers, shutdown.child_token()) {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "Could not subscribe to the event bus; aborting");
            std::process::exit(3);
        }
    };

    info!(
        base_url = %service_config.base_url,
        concurrency = service_config.dispatch.concurrency,
        "Forgehook dispatch service running"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, draining in-flight triggers");

    bus.close();
    dispatch.shutdown().await;

    info!("Forgehook dispatch service stopped");
    Ok(())
}
