use std::collections::BTreeMap;
use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::analytics::TrendPoint;
use crate::models::report::{PerformanceReportRecord, ReportStats};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        developer_id,
        month,
        question_scores,
        category_scores,
        weighted_average_score,
        highlights,
        points_to_develop,
        created_at
    FROM performance_reports
"#;

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub id: String,
    pub developer_id: String,
    pub month: String,
    pub question_scores: String,
    pub category_scores: String,
    pub weighted_average_score: f64,
    pub highlights: String,
    pub points_to_develop: String,
    pub created_at: String,
}

impl ReportRow {
    pub fn from_record(record: &PerformanceReportRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            developer_id: record.developer_id.clone(),
            month: record.month.clone(),
            question_scores: serialize_scores(&record.question_scores)?,
            category_scores: serialize_scores(&record.category_scores)?,
            weighted_average_score: record.weighted_average_score,
            highlights: record.highlights.clone(),
            points_to_develop: record.points_to_develop.clone(),
            created_at: record.created_at.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<PerformanceReportRecord> {
        Ok(PerformanceReportRecord {
            id: self.id,
            developer_id: self.developer_id,
            month: self.month,
            question_scores: deserialize_scores(&self.question_scores)?,
            category_scores: deserialize_scores(&self.category_scores)?,
            weighted_average_score: self.weighted_average_score,
            highlights: self.highlights,
            points_to_develop: self.points_to_develop,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<&Row<'_>> for ReportRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            developer_id: row.get("developer_id")?,
            month: row.get("month")?,
            question_scores: row.get("question_scores")?,
            category_scores: row.get("category_scores")?,
            weighted_average_score: row.get("weighted_average_score")?,
            highlights: row.get("highlights")?,
            points_to_develop: row.get("points_to_develop")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct ReportRepository;

impl ReportRepository {
    pub fn insert(conn: &Connection, row: &ReportRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO performance_reports (
                    id,
                    developer_id,
                    month,
                    question_scores,
                    category_scores,
                    weighted_average_score,
                    highlights,
                    points_to_develop,
                    created_at
                ) VALUES (
                    :id,
                    :developer_id,
                    :month,
                    :question_scores,
                    :category_scores,
                    :weighted_average_score,
                    :highlights,
                    :points_to_develop,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":developer_id": &row.developer_id,
                ":month": &row.month,
                ":question_scores": &row.question_scores,
                ":category_scores": &row.category_scores,
                ":weighted_average_score": &row.weighted_average_score,
                ":highlights": &row.highlights,
                ":points_to_develop": &row.points_to_develop,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<PerformanceReportRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| ReportRow::try_from(row))
            .optional()?;

        row.map(|row| row.into_record()).transpose()
    }

    pub fn exists_for_month(conn: &Connection, developer_id: &str, month: &str) -> AppResult<bool> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*)
                FROM performance_reports
                WHERE developer_id = :developer_id AND month = :month
            "#,
            named_params! {":developer_id": developer_id, ":month": month},
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<PerformanceReportRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY month DESC, created_at DESC"))?;
        let records = collect_reports(stmt.query_map([], |row| ReportRow::try_from(row))?);
        records
    }

    /// Reports of one developer, most recent month first.
    pub fn list_by_developer(
        conn: &Connection,
        developer_id: &str,
    ) -> AppResult<Vec<PerformanceReportRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE developer_id = :developer_id ORDER BY month DESC"
        ))?;
        let records = collect_reports(
            stmt.query_map(named_params! {":developer_id": developer_id}, |row| {
                ReportRow::try_from(row)
            })?,
        );
        records
    }

    pub fn latest_for_developer(
        conn: &Connection,
        developer_id: &str,
    ) -> AppResult<Option<PerformanceReportRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE developer_id = :developer_id ORDER BY month DESC LIMIT 1"
        ))?;
        let row = stmt
            .query_row(named_params! {":developer_id": developer_id}, |row| {
                ReportRow::try_from(row)
            })
            .optional()?;

        row.map(|row| row.into_record()).transpose()
    }

    pub fn list_by_month(conn: &Connection, month: &str) -> AppResult<Vec<PerformanceReportRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE month = :month ORDER BY created_at, id"
        ))?;
        let records = collect_reports(stmt.query_map(named_params! {":month": month}, |row| {
            ReportRow::try_from(row)
        })?);
        records
    }

    /// Month/score pairs for one developer, ascending by month. Zero-padded
    /// `YYYY-MM` keys make the lexicographic sort chronological.
    pub fn trend_for_developer(conn: &Connection, developer_id: &str) -> AppResult<Vec<TrendPoint>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT month, weighted_average_score
                FROM performance_reports
                WHERE developer_id = :developer_id
                ORDER BY month ASC
            "#,
        )?;

        let points = stmt
            .query_map(named_params! {":developer_id": developer_id}, |row| {
                Ok(TrendPoint {
                    month: row.get(0)?,
                    score: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(points)
    }

    pub fn distinct_months(conn: &Connection) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT month FROM performance_reports ORDER BY month ASC",
        )?;
        let months = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(months)
    }

    pub fn stats(conn: &Connection) -> AppResult<ReportStats> {
        conn.query_row(
            r#"
                SELECT
                    COUNT(*),
                    COUNT(DISTINCT developer_id),
                    COUNT(DISTINCT month),
                    AVG(weighted_average_score)
                FROM performance_reports
            "#,
            [],
            |row| {
                Ok(ReportStats {
                    total_reports: row.get(0)?,
                    developers_evaluated: row.get(1)?,
                    months_covered: row.get(2)?,
                    average_score: row.get(3)?,
                })
            },
        )
        .map_err(AppError::from)
    }
}

fn collect_reports(
    rows: impl Iterator<Item = Result<ReportRow, rusqlite::Error>>,
) -> AppResult<Vec<PerformanceReportRecord>> {
    rows.map(|row| {
        row.map_err(AppError::from)
            .and_then(|row| row.into_record())
    })
    .collect()
}

fn serialize_scores(scores: &BTreeMap<String, f64>) -> AppResult<String> {
    serde_json::to_string(scores).map_err(AppError::from)
}

fn deserialize_scores(raw: &str) -> AppResult<BTreeMap<String, f64>> {
    serde_json::from_str(raw).map_err(AppError::from)
}
