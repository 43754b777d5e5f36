use crate::domain::category::{score_to_percent, Category};
use crate::domain::prediction::PredictionResponse;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceEntry {
    pub category: Category,
    pub score: f64,
    pub percentage: f64,
    pub color_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedResult {
    pub prediction: Category,
    pub dominant_percentage: f64,
    pub color_key: &'static str,
    /// Highest score first; equal scores in High, Medium, Low order.
    pub breakdown: Vec<ConfidenceEntry>,
    pub interpretation: &'static str,
}

pub fn interpretation(category: Category) -> &'static str {
    match category {
        Category::High => {
            "Your SME shows strong indicators for high growth potential. Focus on scaling operations and maintaining momentum."
        }
        Category::Medium => {
            "Your SME demonstrates moderate growth potential. Consider addressing key challenges to move toward high growth."
        }
        Category::Low => {
            "Your SME may face growth challenges. Focus on improving operational efficiency and addressing identified barriers."
        }
    }
}

pub fn present(response: &PredictionResponse) -> PresentedResult {
    let mut breakdown: Vec<ConfidenceEntry> = response
        .confidence_scores
        .iter()
        .map(|(category, score)| ConfidenceEntry {
            category,
            score: *score,
            percentage: score_to_percent(*score),
            color_key: category.color_key(),
        })
        .collect();
    // Scores are validated finite, and -0.0 must tie with 0.0.
    breakdown.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    PresentedResult {
        prediction: response.prediction,
        dominant_percentage: score_to_percent(response.dominant_score()),
        color_key: response.prediction.color_key(),
        breakdown,
        interpretation: interpretation(response.prediction),
    }
}
