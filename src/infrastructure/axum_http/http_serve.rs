use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            generation_providers::ProviderAdapter, sessions::SharedSessionRepository,
        },
        value_objects::enums::generation_kinds::GenerationKind,
    },
    infrastructure::{
        axum_http::{default_routers, routers},
        memory::repositories::{
            credit_ledger::MemoryCreditLedger, generation_jobs::MemoryGenerationJobs,
            sessions::MemorySessions, users::MemoryUsers,
        },
        providers::{
            chain::{ChainPolicy, ProviderChain},
            flux::FluxQueueProvider,
            lumalabs::LumaDreamMachineProvider,
            stability::StabilityImageProvider,
            stock_assets::StockAssetProvider,
            veo::VeoVideoProvider,
        },
    },
};

pub async fn start(config: Arc<DotEnvyConfig>) -> Result<()> {
    let ledger = Arc::new(MemoryCreditLedger::new());
    let jobs = Arc::new(MemoryGenerationJobs::new());
    let users = Arc::new(MemoryUsers::new());
    let sessions = Arc::new(MemorySessions::new());
    let shared_sessions: SharedSessionRepository = sessions.clone();

    let policy = ChainPolicy {
        attempt_timeout: Duration::from_secs(config.dispatch.attempt_timeout_secs),
        poll_timeout: Duration::from_secs(config.dispatch.poll_timeout_secs),
        max_poll_attempts: config.dispatch.max_poll_attempts,
        max_poll_window: Duration::from_secs(config.dispatch.max_poll_window_secs),
    };

    // Best quality first; the stock gallery closes each chain so dispatch
    // always terminates in a result.
    let image_adapters: Vec<Arc<dyn ProviderAdapter + Send + Sync>> = vec![
        Arc::new(FluxQueueProvider::new(&config.providers.flux)),
        Arc::new(StabilityImageProvider::new(&config.providers.stability)),
        Arc::new(StockAssetProvider::new(GenerationKind::Image)),
    ];
    let video_adapters: Vec<Arc<dyn ProviderAdapter + Send + Sync>> = vec![
        Arc::new(VeoVideoProvider::new(&config.providers.veo)),
        Arc::new(LumaDreamMachineProvider::new(&config.providers.luma)),
        Arc::new(StockAssetProvider::new(GenerationKind::Video)),
    ];
    let image_chain = Arc::new(ProviderChain::new(
        GenerationKind::Image,
        image_adapters,
        policy.clone(),
    ));
    let video_chain = Arc::new(ProviderChain::new(
        GenerationKind::Video,
        video_adapters,
        policy,
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/auth",
            routers::accounts::auth_routes(
                Arc::clone(&users),
                Arc::clone(&sessions),
                Arc::clone(&ledger),
                config.credits.initial_grant,
            ),
        )
        .nest(
            "/api/v1/credits",
            routers::accounts::credit_routes(
                Arc::clone(&users),
                Arc::clone(&sessions),
                Arc::clone(&ledger),
                config.credits.initial_grant,
            ),
        )
        .nest(
            "/api/v1/generations",
            routers::generations::routes(
                Arc::clone(&ledger),
                Arc::clone(&jobs),
                image_chain,
                video_chain,
            ),
        )
        .nest("/api/v1/models", routers::models::routes())
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(shared_sessions))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
