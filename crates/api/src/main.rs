use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nestegg_core::domain::plan::Plan;
use nestegg_core::domain::request::PlanRequest;
use nestegg_core::engine::templates::TemplateSet;
use nestegg_core::engine::PlanEngine;
use nestegg_core::PlanError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nestegg_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Templates are loaded once; a broken table is fatal at startup, not per request.
    let templates = match settings.load_templates() {
        Ok(templates) => templates,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "allocation templates failed to load");
            return Err(e);
        }
    };
    let engine = PlanEngine::new(templates)?;
    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port()));

    tracing::info!(
        %addr,
        templates = settings.allocation_templates_path.as_deref().unwrap_or("builtin"),
        "api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/plan", post(create_plan))
        .route("/api/templates", get(get_templates))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    engine: Arc<PlanEngine>,
}

/// Failure response: `{"error": "..."}` with a matching status.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidInput(reason) => Self {
                status: StatusCode::BAD_REQUEST,
                message: reason,
            },
            other @ PlanError::Configuration(_) => {
                let err = anyhow::Error::new(other);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "plan failed on allocation configuration");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal error".to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<Plan>, ApiError> {
    let Json(request) = payload?;

    match state.engine.build_plan(&request) {
        Ok(plan) => Ok(Json(plan)),
        Err(err) => {
            if err.is_invalid_input() {
                tracing::warn!(reason = err.reason(), "rejected plan request");
            }
            Err(err.into())
        }
    }
}

async fn get_templates(State(state): State<AppState>) -> Json<TemplateSet> {
    Json(state.engine.templates().clone())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &nestegg_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
