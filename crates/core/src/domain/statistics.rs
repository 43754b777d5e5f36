use crate::domain::category::{round2, Category, PerCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and percentages over the fixed category set.
///
/// Invariants: the distribution sums to `total_predictions`; percentages sum
/// to 100 (within rounding) when there is at least one prediction and are all
/// zero otherwise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStatistics {
    pub total_predictions: u64,
    pub distribution: PerCategory<u64>,
    pub percentages: PerCategory<f64>,
}

impl DashboardStatistics {
    pub fn from_distribution(distribution: PerCategory<u64>) -> Self {
        let total_predictions = distribution.high + distribution.medium + distribution.low;
        let percentages = PerCategory::from_fn(|c| {
            if total_predictions == 0 {
                0.0
            } else {
                round2(*distribution.get(c) as f64 / total_predictions as f64 * 100.0)
            }
        });

        Self {
            total_predictions,
            distribution,
            percentages,
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        *self.distribution.get(category)
    }

    pub fn percentage(&self, category: Category) -> f64 {
        *self.percentages.get(category)
    }
}

/// Store-wide statistics block reported by the history service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceStatistics {
    pub overall: DashboardStatistics,
    /// Mean confidence of the predicted category, for categories that occur.
    pub average_confidence: PerCategory<Option<f64>>,
    pub size_distribution: BTreeMap<String, u64>,
    pub recent_predictions_7days: u64,
}
