use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::http::HeaderValue;
use llm_kit::{ChatMemory, ProviderRegistry};
use prompt_kit::ContextStore;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use vc_feature_service::AppState;
use vc_remote_db::DatabaseManager;

/// Configuration for running the gateway server.
pub struct ServerConfig {
    pub database_url: String,
    pub http_addr: SocketAddr,
    /// Root directory of the prompt context store.
    pub context_dir: PathBuf,
    /// When this receiver gets a value, the server shuts down gracefully.
    pub shutdown: tokio::sync::watch::Receiver<()>,
}

fn build_cors() -> CorsLayer {
    let allowed: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<HeaderValue>().ok()
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);

    let composer = Arc::new(ContextStore::new(&config.context_dir));
    let registry = Arc::new(ProviderRegistry::from_env());
    let memory = ChatMemory::default();

    let feature_state = AppState::new(composer, registry, memory);
    let feature_router = vc_feature_service::create_router(feature_state);
    let backoffice_router = vc_backoffice_service::create_router(db_manager);

    let health_route = axum::Router::new().route(
        "/health",
        axum::routing::get(|| async { axum::http::StatusCode::OK }),
    );

    let http_router = feature_router
        .merge(backoffice_router)
        .merge(health_route)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors());

    tracing::info!("Starting HTTP server at {}", config.http_addr);

    let mut http_shutdown = config.shutdown.clone();
    let http_listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    axum::serve(
        http_listener,
        http_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = http_shutdown.changed().await;
        tracing::info!("Shutting down HTTP server...");
    })
    .await?;

    Ok(())
}
