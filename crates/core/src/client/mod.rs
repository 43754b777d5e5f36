use crate::domain::prediction::{HistoryRecord, PredictionResponse};
use crate::domain::statistics::ServiceStatistics;
use crate::form::PredictionRequest;

pub mod error;
pub mod http;

pub use error::{ApiError, ApiErrorKind, DashboardError, PredictionError};
pub use http::ApiClient;

/// Sends one validated request to the prediction service. Exactly one network
/// call per invocation.
#[async_trait::async_trait]
pub trait PredictionService: Send + Sync {
    async fn submit(&self, request: &PredictionRequest)
        -> Result<PredictionResponse, PredictionError>;
}

/// Read side of the history store.
#[async_trait::async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_statistics(&self) -> Result<ServiceStatistics, DashboardError>;

    /// Most recent records first, at most `limit` of them.
    async fn fetch_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, DashboardError>;

    async fn fetch_record(&self, id: i64) -> Result<Option<HistoryRecord>, DashboardError>;
}
