use serde::{Deserialize, Serialize};

/// One point of a developer's performance timeline, feeding trend charts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: String,
    pub score: f64,
}

/// Per-category score of a single report, feeding radar charts. Categories
/// without data still appear at 0, never omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScoreEntry {
    pub key: String,
    pub label: String,
    pub score: f64,
}

/// Average latest score across the active developers of a team.
/// `average_score` is `None` for an empty team ("no data", not zero).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamRollup {
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    pub developer_count: i64,
}

/// Average weighted score across every report of one month. Developers
/// without a report that month are excluded, not counted as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRollup {
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    pub report_count: i64,
}
