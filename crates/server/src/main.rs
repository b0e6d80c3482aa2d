use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use shared::{
    domain::{Control, ControlPatch},
    error::{ApiError, ErrorCode},
    protocol::{HEALTH_ROUTE, ITEMS_ROUTE, ITEM_ROUTE},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{create_control, delete_control, get_control, list_controls, update_control, ApiContext};
use app_state::AppState;
use config::{load_settings, normalize_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(healthz))
        .route(ITEMS_ROUTE, get(http_list_controls).put(http_create_control))
        .route(
            ITEM_ROUTE,
            get(http_get_control)
                .post(http_update_control)
                .delete(http_delete_control),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            warn!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_list_controls(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Control>>> {
    list_controls(&state.api).await.map(Json).map_err(reject)
}

/// Unknown ids answer `{}` rather than 404.
async fn http_get_control(
    State(state): State<Arc<AppState>>,
    Path(main_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let control = get_control(&state.api, &main_id).await.map_err(reject)?;
    let body = match control {
        Some(control) => serde_json::to_value(control).map_err(|e| {
            reject(ApiError::new(ErrorCode::Internal, e.to_string()))
        })?,
        None => Value::Object(Default::default()),
    };
    Ok(Json(body))
}

async fn http_create_control(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Control>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<String>)> {
    let Json(control) = body.map_err(reject_body)?;
    let message = create_control(&state.api, control).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn http_update_control(
    State(state): State<Arc<AppState>>,
    Path(main_id): Path<String>,
    body: Result<Json<ControlPatch>, JsonRejection>,
) -> ApiResult<Json<String>> {
    let Json(patch) = body.map_err(reject_body)?;
    update_control(&state.api, &main_id, patch)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_delete_control(
    State(state): State<Arc<AppState>>,
    Path(main_id): Path<String>,
) -> ApiResult<Json<String>> {
    delete_control(&state.api, &main_id)
        .await
        .map(Json)
        .map_err(reject)
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %error.message, "request failed");
    }
    (status, Json(error))
}

/// Unreadable bodies keep axum's status but answer with an [`ApiError`].
fn reject_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    let message = rejection.body_text();
    warn!(%message, "rejected request body");
    (
        rejection.status(),
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
