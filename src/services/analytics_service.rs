use tracing::debug;

use crate::db::repositories::developer_repository::DeveloperRepository;
use crate::db::repositories::report_repository::ReportRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::analytics::{CategoryScoreEntry, MonthlyRollup, TeamRollup, TrendPoint};
use crate::models::evaluation::EvaluationSchema;
use crate::models::report::PerformanceReportRecord;
use crate::services::scoring::round2;
use crate::utils::month::normalize_month;

/// Rolls stored report scores up into the views the dashboard renders:
/// per-developer timelines, per-report radar vectors, and team/monthly
/// averages. All derived numbers originate here or in the score
/// calculator; consumers never recompute them.
#[derive(Clone)]
pub struct AnalyticsService {
    db: DbPool,
    schema: EvaluationSchema,
}

impl AnalyticsService {
    pub fn new(db: DbPool, schema: EvaluationSchema) -> AppResult<Self> {
        schema.validate()?;
        Ok(Self { db, schema })
    }

    /// Month/score pairs for one developer, ascending by month, one point
    /// per stored report. Recomputed from storage on every call.
    pub fn time_series(&self, developer_id: &str) -> AppResult<Vec<TrendPoint>> {
        let points = self.db.with_connection(|conn| {
            if DeveloperRepository::find_by_id(conn, developer_id)?.is_none() {
                return Err(AppError::not_found());
            }
            ReportRepository::trend_for_developer(conn, developer_id)
        })?;

        debug!(
            target: "app::analytics",
            developer_id = %developer_id,
            points = points.len(),
            "time series computed"
        );
        Ok(points)
    }

    /// Per-category score vector of a single report in schema order.
    /// Categories missing from the stored map still appear at 0 so radar
    /// charts always show the full outline.
    pub fn category_breakdown(&self, report: &PerformanceReportRecord) -> Vec<CategoryScoreEntry> {
        self.schema
            .categories
            .iter()
            .map(|category| CategoryScoreEntry {
                key: category.key.clone(),
                label: category.label.clone(),
                score: report
                    .category_scores
                    .get(&category.key)
                    .copied()
                    .unwrap_or(0.0),
            })
            .collect()
    }

    /// Average latest score across the active developers of a team.
    /// Archived developers are left out; an empty team yields
    /// `average_score: None` rather than a division by zero.
    pub fn team_rollup(&self, team_id: &str) -> AppResult<TeamRollup> {
        let developers = self.db.with_connection(|conn| {
            if TeamRepository::find_by_id(conn, team_id)?.is_none() {
                return Err(AppError::not_found());
            }
            DeveloperRepository::list_active_by_team(conn, team_id)
        })?;

        let developer_count = developers.len() as i64;
        let average_score = if developers.is_empty() {
            None
        } else {
            let sum: f64 = developers
                .iter()
                .map(|developer| developer.latest_performance_score)
                .sum();
            Some(round2(sum / developers.len() as f64))
        };

        Ok(TeamRollup {
            team_id: team_id.to_string(),
            average_score,
            developer_count,
        })
    }

    /// Average weighted score across every report of the given month.
    /// Developers without a report that month are excluded; "no data" is
    /// never folded in as a zero score.
    pub fn consolidated_rollup(&self, month: &str) -> AppResult<MonthlyRollup> {
        let month = normalize_month(month)?;
        let reports = self
            .db
            .with_connection(|conn| ReportRepository::list_by_month(conn, &month))?;

        let report_count = reports.len() as i64;
        let average_score = if reports.is_empty() {
            None
        } else {
            let sum: f64 = reports
                .iter()
                .map(|report| report.weighted_average_score)
                .sum();
            Some(round2(sum / reports.len() as f64))
        };

        Ok(MonthlyRollup {
            month,
            average_score,
            report_count,
        })
    }
}
