use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::Router;
use clap::Parser;
use common::config::Config;
use http::header;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::model::GenericError;
use crate::storage::ShopStorage;
use crate::web::{carts, orders};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "target/debug/config/total_config.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, GenericError> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let level = config
        .backend
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    tracing::info!(
        project = %config.common.project_name,
        config = %args.config,
        "configuration loaded"
    );
    Ok(config)
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ShopStorage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ShopStorage>) -> Self {
        Self { storage }
    }
}

// The recorder is process-global; installing twice is an error, so the handle
// is cached for every server started in this process.
static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub async fn run_backend(
    config: Config,
    storage: Arc<dyn ShopStorage>,
) -> Result<(), GenericError> {
    let state = AppState::new(storage);
    let metrics_handle = METRICS_HANDLE
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())?
        .clone();

    let app = Router::new()
        .route(
            "/api/carts",
            get(carts::get_cart).post(carts::add_cart_product),
        )
        .route("/api/carts/buy", delete(carts::buy_cart))
        .route(
            "/api/carts/{product_id}",
            put(carts::update_cart_product).delete(carts::delete_cart_product),
        )
        .route("/api/orders", get(orders::get_orders))
        .route("/health", get(health_check))
        .route("/metrics", get(move || async move { metrics_handle.render() }))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin("http://localhost:5173".parse::<header::HeaderValue>().unwrap())
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    tracing::info!("Starting backend service at {}", config.backend.server_address);
    let listener = tokio::net::TcpListener::bind(&config.backend.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
