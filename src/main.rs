use axum::{extract::DefaultBodyLimit, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting civic report API in {:?} mode", config.environment);

    // A failed migration leaves the server up in degraded mode; /health
    // reports the database problem.
    if let Err(e) = database::manager::DatabaseManager::migrate().await {
        tracing::warn!("migrations not applied: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CIVIC_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("civic report API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let uploads_dir = config::config().api.uploads_dir.clone();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        // Protected reporter routes
        .merge(issue_routes())
        // Authority routes (JWT + role gate)
        .merge(authority_routes())
        // Caption assist + photo upload
        .merge(assist_routes())
        // Stored report photos
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users/login-phone", post(auth::login_phone))
}

fn issue_routes() -> Router {
    use axum::routing::post;
    use handlers::issues;

    Router::new()
        .route("/api/users/report", post(issues::report))
        .route("/api/users/my-issues", get(issues::my_issues))
        .route("/api/issues", get(issues::list))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

fn authority_routes() -> Router {
    use axum::routing::post;
    use handlers::authority;

    // Layers run outside-in: the JWT guard populates the user context, the
    // role gate then checks it.
    Router::new()
        .route("/authority/update-status", post(authority::update_status))
        .route("/authority/reports", get(authority::reports))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_authority,
        ))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

fn assist_routes() -> Router {
    use axum::routing::post;
    use handlers::{detect, upload};

    Router::new()
        .route("/api/ai/detect", post(detect::detect))
        .route("/api/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(config::config().api.max_upload_bytes))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Civic Report API",
            "version": version,
            "description": "Civic issue reporting backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "users": "/api/users/register, /api/users/login, /api/users/login-phone (public)",
                "report": "/api/users/report, /api/users/my-issues (authenticated)",
                "issues": "/api/issues?reportedBy=<id> (authenticated)",
                "assist": "/api/ai/detect, /api/upload (public)",
                "authority": "/authority/reports, /authority/update-status (authority role)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
