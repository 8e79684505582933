use std::time::Duration;

use colored::Colorize;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tiercache_core::registry::{ClearReport, DiagnosticsReport, StatsReport};
use tiercache_core::warm::WarmResult;

use crate::error::CliError;

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    pub cache: CacheHealth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheHealth {
    pub status: String,
    pub tiers: usize,
    #[serde(default)]
    pub degraded: Vec<String>,
}

/// Error body returned by the server for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Statuses whose body is a clear report rather than an error.
const CLEAR_STATUSES: &[StatusCode] = &[StatusCode::MULTI_STATUS];

/// Statuses whose body is a warm result rather than an error.
const WARM_STATUSES: &[StatusCode] = &[
    StatusCode::MULTI_STATUS,
    StatusCode::CONFLICT,
    StatusCode::BAD_GATEWAY,
    StatusCode::GATEWAY_TIMEOUT,
];

pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    verbose: bool,
}

impl AdminClient {
    pub fn new(base_url: &str, timeout: Duration, verbose: bool) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CliError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            verbose,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of `POST /admin/cache/warm/{tier}` with the tier as one encoded segment.
    pub fn warm_url(&self, tier: &str) -> Result<Url, CliError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CliError::Request(format!("invalid admin url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| CliError::Request(format!("invalid admin url '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["admin", "cache", "warm", tier]);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        report_statuses: &[StatusCode],
    ) -> Result<T, CliError> {
        self.send_to(method, self.url(path), query, report_statuses)
            .await
    }

    async fn send_to<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        query: &[(&str, &str)],
        report_statuses: &[StatusCode],
    ) -> Result<T, CliError> {
        if self.verbose {
            eprintln!("{} {} {}", "→".dimmed(), method, url);
        }

        let resp = self
            .http
            .request(method, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| CliError::from_transport(&self.base_url, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CliError::from_transport(&self.base_url, e))?;

        if self.verbose {
            eprintln!("{} {}", "←".dimmed(), status);
            eprintln!("{}", body.dimmed());
        }

        if status.is_success() || report_statuses.contains(&status) {
            return serde_json::from_str(&body).map_err(|e| CliError::Decode {
                url,
                reason: e.to_string(),
            });
        }

        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => format!("{}: {}", err.error, err.message),
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => body,
        };
        Err(CliError::Http {
            status: status.as_u16(),
            message,
        })
    }

    /// Checks that the admin endpoint answers at all.
    pub async fn health(&self) -> Result<HealthStatus, CliError> {
        self.send(Method::GET, "/health", &[], &[]).await
    }

    pub async fn clear_all(&self) -> Result<ClearReport, CliError> {
        self.send(Method::POST, "/admin/cache/clear-all", &[], CLEAR_STATUSES)
            .await
    }

    pub async fn clear_user(&self, user_id: &str) -> Result<ClearReport, CliError> {
        self.send(
            Method::POST,
            "/admin/cache/clear-user",
            &[("user_id", user_id)],
            CLEAR_STATUSES,
        )
        .await
    }

    pub async fn stats(&self) -> Result<StatsReport, CliError> {
        self.send(Method::GET, "/admin/cache/stats", &[], &[]).await
    }

    pub async fn diagnostics(&self, user_id: Option<&str>) -> Result<DiagnosticsReport, CliError> {
        let query: Vec<(&str, &str)> = user_id.map(|id| ("user_id", id)).into_iter().collect();
        self.send(Method::GET, "/cache_diagnostics", &query, &[])
            .await
    }

    pub async fn warm(&self, tier: &str) -> Result<WarmResult, CliError> {
        if tier == "secrets" {
            return self
                .send(Method::POST, "/admin/cache/warm-secrets", &[], WARM_STATUSES)
                .await;
        }
        let url = self.warm_url(tier)?;
        self.send_to(Method::POST, url.into(), &[], WARM_STATUSES)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> AdminClient {
        AdminClient::new(base_url, Duration::from_secs(1), false).unwrap()
    }

    #[test]
    fn warm_url_encodes_tier_segment() {
        let url = client("http://localhost:8000").warm_url("a/b?c#d").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8000/admin/cache/warm/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn warm_url_keeps_base_path() {
        let url = client("http://proxy.local/tiercache/").warm_url("user-cases").unwrap();

        assert_eq!(
            url.as_str(),
            "http://proxy.local/tiercache/admin/cache/warm/user-cases"
        );
    }
}
