use crate::domain::category::{Category, ConfidenceScores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated answer from the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Category,
    pub confidence_scores: ConfidenceScores,
    pub message: Option<String>,
}

impl PredictionResponse {
    pub fn dominant_score(&self) -> f64 {
        *self.confidence_scores.get(self.prediction)
    }
}

/// One stored prediction as reported by the history service. Read-only on
/// the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub prediction: Category,
    pub confidence_scores: ConfidenceScores,
    pub enterprise_size: Option<String>,
    pub enterprise_age: Option<i64>,
}

impl HistoryRecord {
    pub fn dominant_score(&self) -> f64 {
        *self.confidence_scores.get(self.prediction)
    }

    /// View the stored outcome as a prediction response, so it can be
    /// presented the same way as a fresh one.
    pub fn as_response(&self) -> PredictionResponse {
        PredictionResponse {
            prediction: self.prediction,
            confidence_scores: self.confidence_scores,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
