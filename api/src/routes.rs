use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use seo_rewriter::config_store::key_prefix;
use seo_rewriter::history_store::DEFAULT_RECENT_LIMIT;
use seo_rewriter::{
    AiStatus, ConfigStore, HistoryEntry, HistoryStore, NewHistoryEntry, Provider, RewriteError,
    RewriteRequest, RewriteResult, RewriteService, StaticWebSearch, WebSearch,
};

use crate::api_error::ApiError;
use crate::api_response::{ActionResponse, HealthResponse, StatsResponse};
use crate::config_payload::{ConfigPayload, HistoryQuery};

#[derive(Clone)]
pub struct AppState {
    pub config_store: Arc<ConfigStore>,
    pub history: Arc<HistoryStore>,
    pub rewriter: Arc<RewriteService>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ai-status", get(ai_status))
        .route("/api/config", post(save_config))
        .route("/api/test-connection", post(test_connection))
        .route("/api/rewrite", post(rewrite))
        .route("/api/stats", get(stats))
        .route("/api/history", get(history).delete(clear_history))
        .route("/api/history/:id", get(history_entry))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn ai_status(State(state): State<AppState>) -> Json<AiStatus> {
    Json(state.config_store.status())
}

async fn save_config(
    State(state): State<AppState>,
    payload: Result<Json<ConfigPayload>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(payload) = payload.map_err(ApiError::from_rejection)?;
    state.config_store.save(
        payload.provider().unwrap_or_default(),
        payload.key().unwrap_or_default(),
    )?;
    Ok(Json(ActionResponse::ok("Configuração salva com sucesso")))
}

async fn test_connection(
    State(state): State<AppState>,
    payload: Result<Json<ConfigPayload>, JsonRejection>,
) -> (StatusCode, Json<ActionResponse>) {
    let failed = |message: &str| (StatusCode::BAD_REQUEST, Json(ActionResponse::failed(message)));

    let Ok(Json(payload)) = payload else {
        return failed("Provider and API key are required");
    };
    let (Some(provider), Some(api_key)) = (payload.provider(), payload.key()) else {
        return failed("Provider and API key are required");
    };
    let Ok(provider) = provider.parse::<Provider>() else {
        return failed("Unsupported AI provider");
    };

    match state.rewriter.test_connection(provider, api_key).await {
        Ok(()) => (StatusCode::OK, Json(ActionResponse::ok("Conexão testada com sucesso"))),
        Err(e) => {
            log::error!("Connection test with {} failed: {}", provider, e);
            failed("Falha na conexão com a IA")
        }
    }
}

async fn rewrite(
    State(state): State<AppState>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<RewriteResult>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    request.validate()?;

    let config = state
        .config_store
        .get_active()
        .ok_or_else(RewriteError::not_configured)?;
    log::info!(
        "Using provider {} (key: {}...)",
        config.provider,
        key_prefix(&config.api_key)
    );

    let search = StaticWebSearch::new(request.target_keyword.trim());
    let result = state
        .rewriter
        .rewrite(&request, &config, Some(&search as &dyn WebSearch))
        .await?;

    if let Err(e) = state
        .history
        .append(NewHistoryEntry::from_rewrite(&request, &result))
    {
        log::warn!("Failed to save rewrite history, continuing: {}", e);
    }

    Ok(Json(result))
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.history.stats().into())
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(state.history.recent(limit))
}

async fn history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryEntry>, ApiError> {
    Uuid::parse_str(&id)
        .ok()
        .and_then(|id| state.history.get(id))
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("History entry {} not found", id)))
}

async fn clear_history(State(state): State<AppState>) -> Json<ActionResponse> {
    state.history.clear();
    Json(ActionResponse::ok("Histórico limpo com sucesso"))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
