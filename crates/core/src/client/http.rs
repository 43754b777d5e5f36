use crate::client::error::ApiError;
use crate::client::{DashboardError, DashboardSource, PredictionError, PredictionService};
use crate::config::Settings;
use crate::domain::contract::{
    WireHistoryResponse, WirePredictionResponse, WireRecordResponse, WireStatisticsResponse,
};
use crate::domain::prediction::{HealthStatus, HistoryRecord, PredictionResponse};
use crate::domain::statistics::ServiceStatistics;
use crate::form::PredictionRequest;
use crate::report::{ExportError, ReportArtifact, ReportSource};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const PREDICT_PATH: &str = "/api/predict";
const STATISTICS_PATH: &str = "/api/dashboard/stats";
const HISTORY_PATH: &str = "/api/dashboard/history";
const RECORD_PATH: &str = "/api/dashboard/prediction";
const REPORT_PATH: &str = "/api/dashboard/report";
const HEALTH_PATH: &str = "/health";

/// HTTP client for the prediction, history and report services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.api_base_url.clone(),
            Duration::from_secs(settings.api_timeout_secs),
        )
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build api http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Send once and read the whole body as text.
    async fn send_text(
        &self,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<(StatusCode, String), ApiError> {
        let t0 = Instant::now();
        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let text = res.text().await.map_err(ApiError::network)?;

        tracing::debug!(
            url,
            %status,
            elapsed_ms = t0.elapsed().as_millis(),
            "api response"
        );
        Ok((status, text))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let (status, text) = self.send_text(self.http.get(url), url).await?;
        if !status.is_success() {
            return Err(service_error(status, &text));
        }
        decode_json(url, &text)
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(&self.url(HEALTH_PATH)).await
    }
}

#[async_trait::async_trait]
impl PredictionService for ApiClient {
    async fn submit(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        let url = self.url(PREDICT_PATH);
        let (status, text) = self
            .send_text(self.http.post(&url).json(request), &url)
            .await?;
        if !status.is_success() {
            return Err(service_error(status, &text));
        }

        let wire: WirePredictionResponse = decode_json(&url, &text)?;
        wire.validate_and_into_response()
            .map_err(|err| protocol_violation(&url, err))
    }
}

#[async_trait::async_trait]
impl DashboardSource for ApiClient {
    async fn fetch_statistics(&self) -> Result<ServiceStatistics, DashboardError> {
        let url = self.url(STATISTICS_PATH);
        let wire: WireStatisticsResponse = self.get_json(&url).await?;
        wire.statistics
            .validate_and_into_statistics()
            .map_err(|err| protocol_violation(&url, err))
    }

    async fn fetch_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, DashboardError> {
        let url = format!("{}?limit={limit}", self.url(HISTORY_PATH));
        let wire: WireHistoryResponse = self.get_json(&url).await?;
        wire.validate_and_into_records(limit)
            .map_err(|err| protocol_violation(&url, err))
    }

    async fn fetch_record(&self, id: i64) -> Result<Option<HistoryRecord>, DashboardError> {
        let url = self.url(&format!("{RECORD_PATH}/{id}"));
        let (status, text) = self.send_text(self.http.get(&url), &url).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(service_error(status, &text));
        }

        let wire: WireRecordResponse = decode_json(&url, &text)?;
        let record = wire
            .prediction
            .validate_and_into_record()
            .map_err(|err| protocol_violation(&url, err))?;
        if record.id != id {
            return Err(protocol_violation(
                &url,
                anyhow::anyhow!("asked for record {id}, got {}", record.id),
            ));
        }
        Ok(Some(record))
    }
}

#[async_trait::async_trait]
impl ReportSource for ApiClient {
    async fn fetch_report(&self, prediction_id: i64) -> Result<ReportArtifact, ExportError> {
        let url = self.url(&format!("{REPORT_PATH}/{prediction_id}"));
        let res = self.http.get(&url).send().await.map_err(export_network)?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ExportError::NotFound { prediction_id });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res.bytes().await.map_err(export_network)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(ExportError::Unknown {
                message: format!("HTTP {status}: {}", error_detail(status, &body)),
            });
        }
        if bytes.is_empty() {
            return Err(ExportError::Unknown {
                message: format!("empty report body for prediction {prediction_id}"),
            });
        }
        if let Some(content_type) = content_type.as_deref() {
            if !is_report_content_type(content_type) {
                tracing::warn!(url = %url, prediction_id, content_type, "report is not a document");
                return Err(ExportError::Unknown {
                    message: format!(
                        "report for prediction {prediction_id} has content type {content_type:?}, expected a PDF"
                    ),
                });
            }
        }

        tracing::debug!(url = %url, prediction_id, bytes = bytes.len(), "report downloaded");
        Ok(ReportArtifact {
            prediction_id,
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, ApiError> {
    serde_json::from_str::<T>(text)
        .with_context(|| format!("response body does not match the expected shape: {text}"))
        .map_err(|err| protocol_violation(url, err))
}

fn protocol_violation(url: &str, err: anyhow::Error) -> ApiError {
    tracing::warn!(url, error = %format!("{err:#}"), "service contract violation");
    ApiError::protocol(err)
}

fn service_error(status: StatusCode, body: &str) -> ApiError {
    ApiError::Service {
        status: status.as_u16(),
        message: error_detail(status, body),
    }
}

/// FastAPI puts its error text under `detail`; fall back to the raw body,
/// then to the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

const REPORT_CONTENT_TYPES: [&str; 2] = ["application/pdf", "application/octet-stream"];

/// Compares the media type only, ignoring parameters and case.
fn is_report_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    REPORT_CONTENT_TYPES.contains(&essence.as_str())
}

fn export_network(err: reqwest::Error) -> ExportError {
    ExportError::Network {
        message: format!("{:#}", anyhow::Error::from(err)),
    }
}
