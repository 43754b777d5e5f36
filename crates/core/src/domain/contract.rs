//! Wire shapes returned by the external services, and their validation into
//! domain types. Nothing downstream of these functions sees unchecked data.

use crate::domain::category::{
    Category, ConfidenceScores, PerCategory, SCORE_SUM_TOLERANCE,
};
use crate::domain::prediction::{HistoryRecord, PredictionResponse};
use crate::domain::statistics::{DashboardStatistics, ServiceStatistics};
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

// The history store writes `CURRENT_TIMESTAMP`, which has no offset and is UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, Deserialize)]
pub struct WirePredictionResponse {
    pub prediction: String,
    pub confidence_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl WirePredictionResponse {
    pub fn validate_and_into_response(self) -> anyhow::Result<PredictionResponse> {
        let prediction = self.prediction.parse::<Category>()?;
        let confidence_scores = validate_scores(&self.confidence_scores, prediction)?;
        Ok(PredictionResponse {
            prediction,
            confidence_scores,
            message: self.message,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryRecord {
    pub id: i64,
    pub timestamp: String,
    pub prediction: String,
    pub confidence_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub enterprise_size: Option<String>,
    #[serde(default)]
    pub enterprise_age: Option<i64>,
}

impl WireHistoryRecord {
    pub fn validate_and_into_record(self) -> anyhow::Result<HistoryRecord> {
        let id = self.id;
        let timestamp = parse_timestamp(&self.timestamp)
            .with_context(|| format!("record {id}: invalid timestamp"))?;
        let prediction = self
            .prediction
            .parse::<Category>()
            .with_context(|| format!("record {id}: invalid prediction"))?;
        let confidence_scores = validate_scores(&self.confidence_scores, prediction)
            .with_context(|| format!("record {id}: invalid confidence scores"))?;

        let enterprise_size = self
            .enterprise_size
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(HistoryRecord {
            id,
            timestamp,
            prediction,
            confidence_scores,
            enterprise_size,
            enterprise_age: self.enterprise_age,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryResponse {
    #[serde(default)]
    pub count: Option<usize>,
    pub predictions: Vec<WireHistoryRecord>,
}

impl WireHistoryResponse {
    pub fn validate_and_into_records(self, limit: usize) -> anyhow::Result<Vec<HistoryRecord>> {
        if let Some(count) = self.count {
            ensure!(
                count == self.predictions.len(),
                "history count mismatch: declared {count}, got {}",
                self.predictions.len()
            );
        }
        ensure!(
            self.predictions.len() <= limit,
            "history returned {} records for limit {limit}",
            self.predictions.len()
        );

        let mut seen_ids = BTreeSet::<i64>::new();
        let mut records = Vec::with_capacity(self.predictions.len());
        for wire in self.predictions {
            ensure!(seen_ids.insert(wire.id), "duplicate record id: {}", wire.id);
            records.push(wire.validate_and_into_record()?);
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRecordResponse {
    pub prediction: WireHistoryRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStatisticsResponse {
    pub statistics: WireStatistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStatistics {
    pub total_predictions: u64,
    #[serde(default)]
    pub distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub percentages: BTreeMap<String, f64>,
    #[serde(default)]
    pub average_confidence: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub size_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub recent_predictions_7days: u64,
}

impl WireStatistics {
    /// Normalizes the reported block onto the fixed category set. Counts must
    /// add up to the reported total, and reported percentages must agree with
    /// the counts; the percentages kept are recomputed with display rounding.
    pub fn validate_and_into_statistics(self) -> anyhow::Result<ServiceStatistics> {
        let mut distribution = PerCategory::<u64>::default();
        for (label, count) in &self.distribution {
            let category = label
                .parse::<Category>()
                .context("invalid statistics distribution")?;
            *distribution.get_mut(category) = *count;
        }

        let overall = DashboardStatistics::from_distribution(distribution);
        ensure!(
            overall.total_predictions == self.total_predictions,
            "statistics distribution sums to {}, but total_predictions is {}",
            overall.total_predictions,
            self.total_predictions
        );

        for (label, reported) in &self.percentages {
            let category = label
                .parse::<Category>()
                .context("invalid statistics percentages")?;
            let expected = if overall.total_predictions == 0 {
                0.0
            } else {
                overall.count(category) as f64 / overall.total_predictions as f64 * 100.0
            };
            ensure!(
                reported.is_finite() && (reported - expected).abs() <= 0.01,
                "reported percentage for {category} is {reported}, counts imply {expected:.2}"
            );
        }

        let mut average_confidence = PerCategory::<Option<f64>>::default();
        for (label, avg) in &self.average_confidence {
            let category = label
                .parse::<Category>()
                .context("invalid statistics average_confidence")?;
            if let Some(avg) = avg {
                ensure!(
                    avg.is_finite() && (0.0..=1.0).contains(avg),
                    "average confidence for {category} out of range: {avg}"
                );
            }
            *average_confidence.get_mut(category) = *avg;
        }

        let size_total: u64 = self.size_distribution.values().sum();
        ensure!(
            size_total <= self.total_predictions,
            "size distribution counts {size_total} predictions, total is {}",
            self.total_predictions
        );
        ensure!(
            self.recent_predictions_7days <= self.total_predictions,
            "recent prediction count {} exceeds total {}",
            self.recent_predictions_7days,
            self.total_predictions
        );

        Ok(ServiceStatistics {
            overall,
            average_confidence,
            size_distribution: self.size_distribution,
            recent_predictions_7days: self.recent_predictions_7days,
        })
    }
}

/// Checks a raw score map against the closed category set: every category
/// present exactly once, each score a probability, the total near 1.0, and
/// the predicted category holding the maximum.
pub fn validate_scores(
    raw: &BTreeMap<String, f64>,
    prediction: Category,
) -> anyhow::Result<ConfidenceScores> {
    let mut seen = BTreeSet::<Category>::new();
    let mut scores = ConfidenceScores::default();
    for (label, score) in raw {
        let category = label.parse::<Category>()?;
        ensure!(
            score.is_finite() && (0.0..=1.0).contains(score),
            "confidence for {category} must be between 0 and 1 (got {score})"
        );
        seen.insert(category);
        // Normalizes -0.0.
        *scores.get_mut(category) = *score + 0.0;
    }

    for category in Category::ALL {
        if !seen.contains(&category) {
            bail!("missing confidence score for {category}");
        }
    }

    let total = scores.total();
    ensure!(
        (total - 1.0).abs() <= SCORE_SUM_TOLERANCE,
        "confidence scores must sum to 1.0 (got {total})"
    );
    ensure!(
        *scores.get(prediction) >= scores.max_score(),
        "predicted category {prediction} does not hold the highest confidence"
    );

    Ok(scores)
}

pub fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    bail!("unrecognized timestamp: {s:?}")
}
