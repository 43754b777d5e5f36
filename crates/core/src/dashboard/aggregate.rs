use crate::domain::category::{score_to_percent, Category, PerCategory};
use crate::domain::prediction::HistoryRecord;
use crate::domain::statistics::DashboardStatistics;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MISSING_SIZE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: Category,
    pub value: u64,
    pub color_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub category: Category,
    pub percentage: f64,
    pub color_key: &'static str,
}

/// Chart-ready series, always High, Medium, Low.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub pie: Vec<PieSlice>,
    pub bar: Vec<BarPoint>,
}

impl ChartSeries {
    /// False when every category is zero and the charts have nothing to draw.
    pub fn has_data(&self) -> bool {
        self.pie.iter().any(|s| s.value > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub prediction: Category,
    pub color_key: &'static str,
    /// Confidence of the predicted category, as a percentage.
    pub confidence: f64,
    pub enterprise_size: String,
    pub enterprise_age: Option<i64>,
}

pub fn aggregate(history: &[HistoryRecord]) -> DashboardStatistics {
    let mut distribution = PerCategory::<u64>::default();
    for record in history {
        *distribution.get_mut(record.prediction) += 1;
    }
    DashboardStatistics::from_distribution(distribution)
}

pub fn to_chart_series(stats: &DashboardStatistics) -> ChartSeries {
    let pie = Category::ALL
        .into_iter()
        .map(|c| PieSlice {
            name: c,
            value: stats.count(c),
            color_key: c.color_key(),
        })
        .collect();
    let bar = Category::ALL
        .into_iter()
        .map(|c| BarPoint {
            category: c,
            percentage: stats.percentage(c),
            color_key: c.color_key(),
        })
        .collect();
    ChartSeries { pie, bar }
}

/// One row per record, in the order the store returned them, capped at `limit`.
pub fn table_rows(history: &[HistoryRecord], limit: usize) -> Vec<HistoryRow> {
    history
        .iter()
        .take(limit)
        .map(|record| HistoryRow {
            id: record.id,
            timestamp: record.timestamp,
            prediction: record.prediction,
            color_key: record.prediction.color_key(),
            confidence: score_to_percent(record.dominant_score()),
            enterprise_size: record
                .enterprise_size
                .clone()
                .unwrap_or_else(|| MISSING_SIZE.to_string()),
            enterprise_age: record.enterprise_age,
        })
        .collect()
}
