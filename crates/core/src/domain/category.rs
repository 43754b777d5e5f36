use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed drift of a confidence distribution away from 1.0.
pub const SCORE_SUM_TOLERANCE: f64 = 1e-3;

/// Growth class assigned by the prediction service.
///
/// Declaration order is the display priority (High > Medium > Low) and the
/// tie-break order for equal confidence scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    High,
    Medium,
    Low,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::High, Category::Medium, Category::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::High => "High",
            Category::Medium => "Medium",
            Category::Low => "Low",
        }
    }

    pub fn color_key(self) -> &'static str {
        match self {
            Category::High => "#10b981",
            Category::Medium => "#f59e0b",
            Category::Low => "#ef4444",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown growth category {0:?} (expected High, Medium or Low)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Category::High),
            "Medium" => Ok(Category::Medium),
            "Low" => Ok(Category::Low),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// One value per category of the closed set. Serializes as
/// `{"High": .., "Medium": .., "Low": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerCategory<T> {
    pub high: T,
    pub medium: T,
    pub low: T,
}

impl<T> PerCategory<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            high: f(Category::High),
            medium: f(Category::Medium),
            low: f(Category::Low),
        }
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::High => &self.high,
            Category::Medium => &self.medium,
            Category::Low => &self.low,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::High => &mut self.high,
            Category::Medium => &mut self.medium,
            Category::Low => &mut self.low,
        }
    }

    /// Entries in display priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

pub type ConfidenceScores = PerCategory<f64>;

impl ConfidenceScores {
    pub fn total(&self) -> f64 {
        self.high + self.medium + self.low
    }

    pub fn max_score(&self) -> f64 {
        self.high.max(self.medium).max(self.low)
    }
}

/// Round to two decimals, the display convention for every percentage.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Probability in [0, 1] to a 2-decimal percentage.
pub fn score_to_percent(score: f64) -> f64 {
    round2(score * 100.0)
}
