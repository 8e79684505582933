//! Per-user cache diagnostics.

use axum::{
    extract::{Query, State},
    response::Json,
};
use tiercache_core::registry::DiagnosticsReport;
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::UserIdQuery;
use crate::state::AppState;

/// GET /cache_diagnostics?user_id=
/// Entries del usuario en cada tier key-scoped, mas las estadisticas agregadas.
/// No afecta los contadores de hits/misses.
#[instrument(skip_all, fields(user_id = ?query.user_id))]
pub async fn cache_diagnostics(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DiagnosticsReport>, AppError> {
    let report = state
        .registry()
        .diagnostics(query.user_id.as_deref())
        .await?;
    Ok(Json(report))
}
