use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One evaluation of one developer for one calendar month. Derived fields
/// (`category_scores`, `weighted_average_score`) are computed at submission
/// time; the record is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReportRecord {
    pub id: String,
    pub developer_id: String,
    pub month: String,
    pub question_scores: BTreeMap<String, f64>,
    pub category_scores: BTreeMap<String, f64>,
    pub weighted_average_score: f64,
    pub highlights: String,
    pub points_to_develop: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmitInput {
    pub developer_id: String,
    pub month: String,
    #[serde(default)]
    pub question_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub points_to_develop: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_reports: i64,
    pub developers_evaluated: i64,
    pub months_covered: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}
