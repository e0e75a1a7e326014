use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use server_api::{
    delete_repair, insert_repairs, list_repairs, parse_id_filter, parse_order, update_repair,
    ApiContext, TableQuery,
};
use shared::{
    domain::RepairRecord,
    error::{ApiError, ErrorCode},
    protocol::{repairs_route, InsertBody, RepairPatch},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
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
    let app = build_router(Arc::new(state)).layer(RequestBodyLimitLayer::new(settings.max_body_bytes));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "table service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            &repairs_route(),
            get(http_list_repairs)
                .post(http_insert_repairs)
                .patch(http_update_repair)
                .delete(http_delete_repair),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| reject(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn http_list_repairs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TableQuery>,
) -> ApiResult<Json<Vec<RepairRecord>>> {
    let order = parse_order(q.order.as_deref()).map_err(reject)?;
    let records = list_repairs(&state.api, order).await.map_err(reject)?;
    Ok(Json(records))
}

async fn http_insert_repairs(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InsertBody>,
) -> ApiResult<impl IntoResponse> {
    let created = insert_repairs(&state.api, body.into_rows())
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_update_repair(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TableQuery>,
    Json(patch): Json<RepairPatch>,
) -> ApiResult<StatusCode> {
    let id = parse_id_filter(q.id.as_deref()).map_err(reject)?;
    update_repair(&state.api, id, patch).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_delete_repair(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TableQuery>,
) -> ApiResult<StatusCode> {
    let id = parse_id_filter(q.id.as_deref()).map_err(reject)?;
    delete_repair(&state.api, id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => {
            error!(message = %err.message, "table service internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}
