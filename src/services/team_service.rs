use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::developer_repository::DeveloperRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::developer::DeveloperRecord;
use crate::models::team::{TeamCreateInput, TeamRecord, TeamUpdateInput};

const VALID_COLORS: &[&str] = &[
    "blue", "cyan", "teal", "green", "lime", "yellow", "orange", "red", "pink", "grape",
    "violet", "indigo", "gray",
];

const DEFAULT_COLOR: &str = "blue";

#[derive(Clone)]
pub struct TeamService {
    db: DbPool,
}

impl TeamService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_team(&self, mut input: TeamCreateInput) -> AppResult<TeamRecord> {
        let name = normalize_name(&input.name)?;
        let description = normalize_description(input.description.take());
        let color = normalize_color(input.color.take())?;

        let record = TeamRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            color,
            created_at: Utc::now().to_rfc3339(),
        };

        self.db
            .with_connection(|conn| TeamRepository::insert(conn, &record))?;
        info!(target: "app::teams", team_id = %record.id, "team created");
        Ok(record)
    }

    pub fn update_team(&self, id: &str, update: TeamUpdateInput) -> AppResult<TeamRecord> {
        let mut existing = self.get_team(id)?;

        if let Some(name) = update.name {
            existing.name = normalize_name(&name)?;
        }
        if let Some(description) = update.description {
            existing.description = normalize_description(Some(description));
        }
        if let Some(color) = update.color {
            existing.color = normalize_color(Some(color))?;
        }

        self.db
            .with_connection(|conn| TeamRepository::update(conn, &existing))?;
        info!(target: "app::teams", team_id = %existing.id, "team updated");
        Ok(existing)
    }

    /// Deletes a team and detaches its developers in one transaction.
    /// Developers stay active with `team_id` cleared; they are never
    /// cascade-deleted with their team.
    pub fn delete_team(&self, id: &str) -> AppResult<()> {
        let detached = self.db.with_transaction(|tx| {
            let detached = DeveloperRepository::detach_team(tx, id, &Utc::now().to_rfc3339())?;
            TeamRepository::delete(tx, id)?;
            Ok(detached)
        })?;

        info!(target: "app::teams", team_id = %id, detached, "team deleted");
        Ok(())
    }

    pub fn get_team(&self, id: &str) -> AppResult<TeamRecord> {
        let team = self
            .db
            .with_connection(|conn| TeamRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        Ok(team)
    }

    pub fn list_teams(&self) -> AppResult<Vec<TeamRecord>> {
        let teams = self.db.with_connection(TeamRepository::list_all)?;
        debug!(target: "app::teams", count = teams.len(), "teams listed");
        Ok(teams)
    }

    /// Active developers currently assigned to the team.
    pub fn team_developers(&self, id: &str) -> AppResult<Vec<DeveloperRecord>> {
        self.db.with_connection(|conn| {
            if TeamRepository::find_by_id(conn, id)?.is_none() {
                return Err(AppError::not_found());
            }
            DeveloperRepository::list_active_by_team(conn, id)
        })
    }
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("团队名称不能为空"));
    }
    Ok(name.to_string())
}

fn normalize_description(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string()).unwrap_or_default()
}

fn normalize_color(raw: Option<String>) -> AppResult<String> {
    let color = match raw {
        Some(value) => value.trim().to_lowercase(),
        None => return Ok(DEFAULT_COLOR.to_string()),
    };

    if color.is_empty() {
        return Ok(DEFAULT_COLOR.to_string());
    }

    if !VALID_COLORS.contains(&color.as_str()) {
        return Err(AppError::validation_with_details(
            "未知的团队颜色",
            serde_json::json!({ "color": color, "validColors": VALID_COLORS }),
        ));
    }

    Ok(color)
}
