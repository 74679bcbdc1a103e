use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::evaluation::EvaluationSchema;

/// Derived scores of one evaluation: rounded per-category averages plus the
/// rounded weighted overall score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputedScores {
    pub category_scores: BTreeMap<String, f64>,
    pub weighted_average_score: f64,
}

/// Maps raw question scores to category averages and one weighted overall
/// score. Total over any numeric map: absent question keys count as 0
/// (partial submissions are tolerated), unknown keys are ignored, and no
/// clamping happens here; input range checks belong to the submission
/// layer.
///
/// Rounding is two-stage: each stored category score is rounded on its own,
/// while the overall score is accumulated from the unrounded averages and
/// rounded once at the end. Displayed sub-scores therefore only
/// approximately recombine into the total; do not merge the stages.
pub fn compute_scores(
    schema: &EvaluationSchema,
    question_scores: &BTreeMap<String, f64>,
) -> ComputedScores {
    let mut category_scores = BTreeMap::new();
    let mut total_weighted = 0.0;

    for category in &schema.categories {
        let mut category_total = 0.0;
        let mut category_weight_sum = 0.0;

        for question in &category.questions {
            let score = question_scores.get(&question.key).copied().unwrap_or(0.0);
            category_total += score * f64::from(question.weight);
            category_weight_sum += f64::from(question.weight);
        }

        // A category with zero total question weight contributes 0 to both
        // the display map and the weighted sum; it is not skipped.
        let category_average = if category_weight_sum > 0.0 {
            category_total / category_weight_sum
        } else {
            0.0
        };

        category_scores.insert(category.key.clone(), round2(category_average));
        total_weighted += category_average * category.weight;
    }

    ComputedScores {
        category_scores,
        weighted_average_score: round2(total_weighted),
    }
}

/// Rounds to 2 decimals, the product-wide display precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Qualitative band the dashboard uses for card badges and report tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 8.0 {
            PerformanceBand::Excellent
        } else if score >= 6.0 {
            PerformanceBand::Good
        } else if score >= 4.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excelente",
            PerformanceBand::Good => "Bom",
            PerformanceBand::Fair => "Regular",
            PerformanceBand::NeedsImprovement => "Precisa Melhorar",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "green",
            PerformanceBand::Good => "yellow",
            PerformanceBand::Fair => "orange",
            PerformanceBand::NeedsImprovement => "red",
        }
    }
}
