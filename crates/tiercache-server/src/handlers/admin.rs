//! Cache administration endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tiercache_core::WarmStatus;
use tiercache_core::registry::{ClearReport, StatsReport};
use tiercache_core::warm::WarmResult;
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::UserIdQuery;
use crate::state::AppState;

/// Tier warmed by the `warm-secrets` alias.
pub const SECRETS_TIER: &str = "secrets";

/// 200 si todos los tiers respondieron, 207 con el reporte completo si no.
fn clear_response(report: ClearReport) -> Response {
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    (status, Json(report)).into_response()
}

/// Status HTTP para el resultado de un warm.
pub fn warm_status_code(status: WarmStatus) -> StatusCode {
    match status {
        WarmStatus::Completed | WarmStatus::NotSupported => StatusCode::OK,
        WarmStatus::Partial => StatusCode::MULTI_STATUS,
        WarmStatus::AlreadyRunning => StatusCode::CONFLICT,
        WarmStatus::Failed => StatusCode::BAD_GATEWAY,
        WarmStatus::TimedOut => StatusCode::GATEWAY_TIMEOUT,
    }
}

fn warm_response(result: WarmResult) -> Response {
    (warm_status_code(result.status), Json(result)).into_response()
}

/// POST /admin/cache/clear-all
/// Limpia todos los tiers.
#[instrument(skip_all)]
pub async fn clear_all(State(state): State<AppState>) -> Response {
    clear_response(state.registry().clear_all().await)
}

/// POST /admin/cache/clear-user?user_id=
/// Invalida las entries de un usuario en los tiers key-scoped.
#[instrument(skip_all, fields(user_id = ?query.user_id))]
pub async fn clear_user(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Response, AppError> {
    let user_id = query.required()?;
    let report = state.registry().clear_for_key(user_id).await?;
    Ok(clear_response(report))
}

/// POST /admin/cache/clear/{tier}
/// Limpia un tier.
#[instrument(skip_all, fields(tier = %tier))]
pub async fn clear_tier(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> Result<Response, AppError> {
    let report = state.registry().clear_tier(&tier).await?;
    Ok(clear_response(report))
}

/// GET /admin/cache/stats
/// Estadisticas agregadas de todos los tiers.
#[instrument(skip_all)]
pub async fn stats(State(state): State<AppState>) -> Json<StatsReport> {
    Json(state.registry().stats_all().await)
}

/// POST /admin/cache/warm/{tier}
/// Pre-carga un tier desde su fuente; espera hasta el timeout configurado.
#[instrument(skip_all, fields(tier = %tier))]
pub async fn warm_tier(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> Result<Response, AppError> {
    let result = state
        .registry()
        .warm(&tier, state.warm_timeout())
        .await?;
    Ok(warm_response(result))
}

/// POST /admin/cache/warm-secrets
/// Alias de `warm/{tier}` para el tier de secrets.
#[instrument(skip_all)]
pub async fn warm_secrets(State(state): State<AppState>) -> Result<Response, AppError> {
    let result = state
        .registry()
        .warm(SECRETS_TIER, state.warm_timeout())
        .await?;
    Ok(warm_response(result))
}
