//! Dialog Gateway server entry point.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dialog_gateway::adapters::http::{dialog_routes, DialogHandlers, dialog::SESSION_ID_HEADER};
use dialog_gateway::adapters::identity::UserIdTokenVerifier;
use dialog_gateway::adapters::postgres::PostgresDialogRepository;
use dialog_gateway::adapters::upstream::{
    ChatCompletionAdapter, ChatCompletionConfig, RemoteForwardAdapter,
};
use dialog_gateway::application::{DispatchDialogHandler, UpstreamRegistry};
use dialog_gateway::config::{AppConfig, ServerConfig};
use dialog_gateway::ports::{DialogRepository, IdentityVerifier, UpstreamAdapter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }
    let repository: Arc<dyn DialogRepository> = Arc::new(PostgresDialogRepository::new(pool));

    let client = reqwest::Client::new();
    let local_model: Arc<dyn UpstreamAdapter> = Arc::new(ChatCompletionAdapter::new(
        client.clone(),
        ChatCompletionConfig::new(
            config.upstream.local_api_key().unwrap_or_default(),
            config.upstream.local_model.clone(),
        ),
    ));
    let remote_forward: Arc<dyn UpstreamAdapter> = Arc::new(RemoteForwardAdapter::new(client));

    let registry = UpstreamRegistry::from_targets(
        config.upstream.targets(),
        local_model,
        remote_forward,
    );
    let modes: Vec<&str> = registry.available_modes().iter().map(|m| m.name()).collect();
    tracing::info!(?modes, "upstreams configured");

    let dispatch = DispatchDialogHandler::new(repository, Arc::new(registry))
        .with_channel_capacity(config.upstream.channel_capacity);
    let identity: Arc<dyn IdentityVerifier> = Arc::new(UserIdTokenVerifier);

    let app = dialog_routes(DialogHandlers::new(Arc::new(dispatch)), identity)
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "dialog gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let exposed = HeaderName::from_static(SESSION_ID_HEADER);
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([exposed]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
