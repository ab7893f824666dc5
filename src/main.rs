mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod policy;
mod services;
mod static_files;
mod storage;
mod validation;


use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use handlers::{admin, apk, auth, download, pages, team, user};
use middleware::auth::auth_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::{RateLimiter, TeamService};
use crate::storage::{LocalStorage, StorageProvider};

/// Room for multipart framing on top of the file size cap
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageProvider>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, db: Database, storage: Arc<dyn StorageProvider>) -> Self {
        let limiter = RateLimiter::new(
            config.download.max_attempts,
            Duration::from_secs(config.download.window_secs),
        );
        Self {
            db,
            config: Arc::new(config),
            storage,
            limiter: Arc::new(limiter),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revenge_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting revenge-web...");

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations(&config.app.name).await?;
    TeamService::seed_initial_admin(&db, &config.admin).await?;
    tracing::info!("Database initialized");

    // Initialize APK storage
    let storage: Arc<dyn StorageProvider> = Arc::new(LocalStorage::new(&config.storage.apk_path));
    tracing::info!("APK storage backend: {}", storage.storage_type());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db, storage);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = usize::try_from(state.config.upload.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    // Page shells
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/download", get(pages::download))
        .route("/admin/login", get(pages::admin_login))
        .route("/admin/dashboard", get(pages::admin_dashboard))
        .route("/admin/withdrawals", get(pages::admin_withdrawals))
        .route("/admin/users", get(pages::admin_users))
        .route("/admin/settings", get(pages::admin_settings))
        .route("/admin/team", get(pages::admin_team));

    // Public API (no auth required)
    let public_routes = Router::new()
        .route("/api/stats", get(download::stats))
        .route("/api/apk-info", get(download::apk_info))
        .route("/api/download", get(download::download))
        .route("/api/admin/login", post(auth::login));

    // Admin API (bearer token required)
    let protected_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route(
            "/upload-apk",
            post(apk::upload_apk).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/apk-info", get(apk::apk_info))
        .route("/users", get(user::list_users))
        .route("/users/:id", put(user::update_user))
        .route(
            "/team",
            get(team::list_team).post(team::create_team_member),
        )
        .route("/team/:id", delete(team::delete_team_member))
        .route("/dashboard", get(admin::dashboard))
        .route("/withdrawals", get(admin::withdrawals))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(page_routes)
        .merge(public_routes)
        .nest("/api/admin", protected_routes)
        .nest_service(
            "/assets",
            static_files::assets_service(&state.config.server),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
