use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::repositories::developer_repository::DeveloperRepository;
use crate::db::repositories::report_repository::ReportRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::developer::{DeveloperCreateInput, DeveloperRecord, DeveloperUpdateInput};

#[derive(Clone)]
pub struct DeveloperService {
    db: DbPool,
}

impl DeveloperService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_developer(&self, mut input: DeveloperCreateInput) -> AppResult<DeveloperRecord> {
        let name = normalize_required(&input.name, "姓名不能为空")?;
        let role = normalize_required(&input.role, "职位不能为空")?;
        let team_id = input.team_id.take().filter(|id| !id.trim().is_empty());

        let now = Utc::now().to_rfc3339();
        let record = DeveloperRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            role,
            team_id,
            latest_performance_score: 0.0,
            archived_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.with_connection(|conn| {
            if let Some(team_id) = &record.team_id {
                ensure_team_exists(conn, team_id)?;
            }
            DeveloperRepository::insert(conn, &record)
        })?;

        info!(target: "app::developers", developer_id = %record.id, "developer created");
        Ok(record)
    }

    pub fn update_developer(
        &self,
        id: &str,
        update: DeveloperUpdateInput,
    ) -> AppResult<DeveloperRecord> {
        let mut existing = self.get_developer(id)?;

        if let Some(name) = update.name {
            existing.name = normalize_required(&name, "姓名不能为空")?;
        }
        if let Some(role) = update.role {
            existing.role = normalize_required(&role, "职位不能为空")?;
        }
        if let Some(team_id) = update.team_id {
            existing.team_id = team_id.filter(|value| !value.trim().is_empty());
        }
        existing.updated_at = Utc::now().to_rfc3339();

        self.db.with_connection(|conn| {
            if let Some(team_id) = &existing.team_id {
                ensure_team_exists(conn, team_id)?;
            }
            DeveloperRepository::update(conn, &existing)
        })?;

        info!(target: "app::developers", developer_id = %existing.id, "developer updated");
        Ok(existing)
    }

    pub fn get_developer(&self, id: &str) -> AppResult<DeveloperRecord> {
        let developer = self
            .db
            .with_connection(|conn| DeveloperRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        Ok(developer)
    }

    pub fn list_developers(&self, include_archived: bool) -> AppResult<Vec<DeveloperRecord>> {
        let developers = self
            .db
            .with_connection(|conn| DeveloperRepository::list(conn, include_archived))?;
        debug!(target: "app::developers", count = developers.len(), include_archived, "developers listed");
        Ok(developers)
    }

    pub fn list_archived(&self) -> AppResult<Vec<DeveloperRecord>> {
        self.db.with_connection(DeveloperRepository::list_archived)
    }

    /// Archives (`true`) or restores (`false`) a developer. The transition
    /// is exclusive on the record's current state: when two callers race,
    /// the loser gets a conflict instead of silently re-applying, and a
    /// restore leaves every other attribute untouched.
    pub fn set_archived(&self, id: &str, archived: bool) -> AppResult<DeveloperRecord> {
        let updated = self.db.with_connection(|conn| {
            let existing =
                DeveloperRepository::find_by_id(conn, id)?.ok_or_else(AppError::not_found)?;

            if existing.is_archived() == archived {
                let message = if archived {
                    "开发者已归档"
                } else {
                    "开发者尚未归档"
                };
                return Err(AppError::conflict(message));
            }

            let now = Utc::now().to_rfc3339();
            let archived_at = archived.then(|| now.clone());
            let changed =
                DeveloperRepository::set_archived(conn, id, archived_at.as_deref(), &now)?;
            if changed == 0 {
                // The state moved between the read and the guarded update.
                return Err(AppError::conflict("归档状态已被其他操作修改"));
            }

            DeveloperRepository::find_by_id(conn, id)?.ok_or_else(AppError::not_found)
        })?;

        info!(
            target: "app::developers",
            developer_id = %id,
            archived,
            "developer archive state changed"
        );
        Ok(updated)
    }

    /// Recomputes the denormalized `latest_performance_score` from the
    /// report history (most recent month wins). Idempotent; safe to call
    /// whenever the cache is suspected stale.
    pub fn refresh_latest_score(&self, id: &str) -> AppResult<DeveloperRecord> {
        let refreshed = self.db.with_transaction(|tx| {
            if DeveloperRepository::find_by_id(tx, id)?.is_none() {
                return Err(AppError::not_found());
            }

            let score = ReportRepository::latest_for_developer(tx, id)?
                .map(|report| report.weighted_average_score)
                .unwrap_or(0.0);

            DeveloperRepository::update_latest_score(tx, id, score, &Utc::now().to_rfc3339())?;
            DeveloperRepository::find_by_id(tx, id)?.ok_or_else(AppError::not_found)
        })?;

        debug!(
            target: "app::developers",
            developer_id = %id,
            score = refreshed.latest_performance_score,
            "latest performance score refreshed"
        );
        Ok(refreshed)
    }
}

fn ensure_team_exists(conn: &Connection, team_id: &str) -> AppResult<()> {
    if TeamRepository::find_by_id(conn, team_id)?.is_none() {
        return Err(AppError::not_found());
    }
    Ok(())
}

fn normalize_required(raw: &str, message: &str) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(value.to_string())
}
