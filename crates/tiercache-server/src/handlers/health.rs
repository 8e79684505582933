use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const STATUS_UP: &str = "UP";
pub const STATUS_DEGRADED: &str = "DEGRADED";

/// Estado del subsistema de cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub status: String,
    pub tiers: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache: CacheHealth,
}

impl HealthResponse {
    /// Construye la respuesta a partir de los tiers degradados.
    pub fn from_tiers(tiers: usize, degraded: Vec<String>) -> Self {
        let status = if degraded.is_empty() {
            STATUS_UP
        } else {
            STATUS_DEGRADED
        };

        Self {
            status: status.to_string(),
            version: crate::version().to_string(),
            cache: CacheHealth {
                status: status.to_string(),
                tiers,
                degraded,
            },
        }
    }
}

/// GET /health
/// Siempre 200; `DEGRADED` si algun tier no responde sus stats.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.registry().stats_all().await;
    let degraded = report
        .degraded_tiers()
        .into_iter()
        .map(String::from)
        .collect();

    Json(HealthResponse::from_tiers(report.tiers.len(), degraded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_up_serialization() {
        let json = serde_json::to_value(HealthResponse::from_tiers(4, Vec::new())).unwrap();

        assert_eq!(json["status"], "UP");
        assert_eq!(json["cache"]["tiers"], 4);
        assert!(json["cache"].get("degraded").is_none());
    }

    #[test]
    fn test_health_degraded() {
        let response = HealthResponse::from_tiers(2, vec!["remote".to_string()]);

        assert_eq!(response.status, STATUS_DEGRADED);
        assert_eq!(response.cache.degraded, vec!["remote"]);
    }
}
