// --- File: crates/services/sellerhub_backend/src/app.rs ---
//! Router assembly for the backend.
//!
//! Kept out of `main.rs` so tests can build the same router against an in-memory database.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sellerhub_common::{log_result, Context, SellerHubError};
use sellerhub_config::AppConfig;
use sellerhub_db::{DbClient, ShopeeRepositories};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// State shared by the backend's own routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.is_healthy().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
    }
}

/// Connects storage, creates the schema and mounts every enabled feature under `/api`.
pub async fn build_app(config: Arc<AppConfig>) -> Result<Router, SellerHubError> {
    let db = DbClient::new(&config).await?;
    let repositories = ShopeeRepositories::new(db.clone());
    log_result(
        repositories.init_schema().await,
        "Database schema ready",
        "Database schema initialization failed",
    )
    .context("initializing database schema")?;

    let state = AppState {
        config: config.clone(),
        db,
    };

    #[allow(unused_mut)] // only mutated with features enabled
    let mut api_router = Router::new()
        .route("/", get(|| async { "Welcome to the SellerHub API!" }))
        .route("/health", get(health))
        .with_state(state);

    #[cfg(feature = "shopee")]
    {
        match (config.use_shopee, config.shopee.clone()) {
            (true, Some(shopee_config)) => {
                let service = sellerhub_shopee::ShopeeService::new(shopee_config, repositories)?;
                api_router = api_router.merge(sellerhub_shopee::routes(Arc::new(service)));
                info!("Shopee integration enabled");
            }
            (true, None) => {
                warn!("use_shopee is set but no [shopee] section is configured; Shopee routes disabled")
            }
            (false, _) => info!("Shopee integration disabled by configuration"),
        }
    }
    #[cfg(not(feature = "shopee"))]
    drop(repositories);

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "SellerHub API",
                version = "0.1.0",
                description = "Marketplace partner integration API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            tags( (name = "SellerHub", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)]
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "shopee")]
        openapi_doc.merge(sellerhub_shopee::doc::ShopeeApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
