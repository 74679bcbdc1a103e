use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::developer_repository::DeveloperRepository;
use crate::db::repositories::report_repository::{ReportRepository, ReportRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::evaluation::EvaluationSchema;
use crate::models::report::{PerformanceReportRecord, ReportStats, ReportSubmitInput};
use crate::services::scoring;
use crate::utils::month::normalize_month;

/// Owns performance reports: computes derived scores at submission time and
/// keeps the owning developer's denormalized latest score in step. Reports
/// are immutable once stored; a new evaluation is always a new report.
#[derive(Clone)]
pub struct ReportService {
    db: DbPool,
    schema: EvaluationSchema,
}

impl ReportService {
    pub fn new(db: DbPool, schema: EvaluationSchema) -> AppResult<Self> {
        schema.validate()?;
        Ok(Self { db, schema })
    }

    pub fn schema(&self) -> &EvaluationSchema {
        &self.schema
    }

    /// Validates the submission, derives category and weighted scores, and
    /// stores the report. The duplicate check, insert, and latest-score
    /// refresh share one transaction: a failure commits nothing, and the
    /// `(developer, month)` UNIQUE constraint backstops concurrent
    /// submissions for the same month.
    pub fn submit_report(&self, input: ReportSubmitInput) -> AppResult<PerformanceReportRecord> {
        let month = normalize_month(&input.month)?;
        validate_question_scores(&input.question_scores)?;

        let computed = scoring::compute_scores(&self.schema, &input.question_scores);
        let now = Utc::now().to_rfc3339();
        let record = PerformanceReportRecord {
            id: uuid::Uuid::new_v4().to_string(),
            developer_id: input.developer_id.trim().to_string(),
            month,
            question_scores: input.question_scores,
            category_scores: computed.category_scores,
            weighted_average_score: computed.weighted_average_score,
            highlights: normalize_text(input.highlights),
            points_to_develop: normalize_text(input.points_to_develop),
            created_at: now.clone(),
        };

        let row = ReportRow::from_record(&record)?;
        self.db.with_transaction(|tx| {
            if DeveloperRepository::find_by_id(tx, &record.developer_id)?.is_none() {
                return Err(AppError::not_found());
            }

            if ReportRepository::exists_for_month(tx, &record.developer_id, &record.month)? {
                return Err(AppError::conflict("该开发者在此月份已存在评估报告"));
            }

            ReportRepository::insert(tx, &row)?;

            // Latest score follows month recency, not submission order:
            // back-filling an older month must not overwrite a newer score.
            let latest = ReportRepository::latest_for_developer(tx, &record.developer_id)?
                .ok_or_else(AppError::not_found)?;
            DeveloperRepository::update_latest_score(
                tx,
                &record.developer_id,
                latest.weighted_average_score,
                &now,
            )?;

            Ok(())
        })?;

        info!(
            target: "app::reports",
            report_id = %record.id,
            developer_id = %record.developer_id,
            month = %record.month,
            score = record.weighted_average_score,
            "performance report submitted"
        );
        Ok(record)
    }

    pub fn get_report(&self, id: &str) -> AppResult<PerformanceReportRecord> {
        let report = self
            .db
            .with_connection(|conn| ReportRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        Ok(report)
    }

    pub fn list_reports(&self) -> AppResult<Vec<PerformanceReportRecord>> {
        let reports = self.db.with_connection(ReportRepository::list_all)?;
        debug!(target: "app::reports", count = reports.len(), "reports listed");
        Ok(reports)
    }

    /// Reports of one developer, most recent month first.
    pub fn reports_by_developer(
        &self,
        developer_id: &str,
    ) -> AppResult<Vec<PerformanceReportRecord>> {
        self.db
            .with_connection(|conn| ReportRepository::list_by_developer(conn, developer_id))
    }

    pub fn latest_report(&self, developer_id: &str) -> AppResult<Option<PerformanceReportRecord>> {
        self.db
            .with_connection(|conn| ReportRepository::latest_for_developer(conn, developer_id))
    }

    pub fn reports_by_month(&self, month: &str) -> AppResult<Vec<PerformanceReportRecord>> {
        let month = normalize_month(month)?;
        self.db
            .with_connection(|conn| ReportRepository::list_by_month(conn, &month))
    }

    /// Distinct months with at least one report, ascending.
    pub fn available_months(&self) -> AppResult<Vec<String>> {
        self.db.with_connection(ReportRepository::distinct_months)
    }

    pub fn stats(&self) -> AppResult<ReportStats> {
        let mut stats = self.db.with_connection(ReportRepository::stats)?;
        stats.average_score = stats.average_score.map(scoring::round2);
        Ok(stats)
    }
}

fn normalize_text(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string()).unwrap_or_default()
}

/// Range check for raw submissions. The calculator itself stays total over
/// any numeric map; collection-side validation is the only gate.
fn validate_question_scores(scores: &BTreeMap<String, f64>) -> AppResult<()> {
    for (key, value) in scores {
        if !value.is_finite() || *value < 0.0 || *value > 10.0 {
            return Err(AppError::validation_with_details(
                "评分必须在 0 到 10 之间",
                serde_json::json!({ "questionKey": key, "score": value }),
            ));
        }
    }
    Ok(())
}
