use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::developer::DeveloperRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        role,
        team_id,
        latest_performance_score,
        archived_at,
        created_at,
        updated_at
    FROM developers
"#;

fn map_developer(row: &Row<'_>) -> rusqlite::Result<DeveloperRecord> {
    Ok(DeveloperRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        role: row.get("role")?,
        team_id: row.get("team_id")?,
        latest_performance_score: row.get("latest_performance_score")?,
        archived_at: row.get("archived_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub struct DeveloperRepository;

impl DeveloperRepository {
    pub fn insert(conn: &Connection, record: &DeveloperRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO developers (
                    id,
                    name,
                    role,
                    team_id,
                    latest_performance_score,
                    archived_at,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :name,
                    :role,
                    :team_id,
                    :latest_performance_score,
                    :archived_at,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":role": &record.role,
                ":team_id": &record.team_id,
                ":latest_performance_score": &record.latest_performance_score,
                ":archived_at": &record.archived_at,
                ":created_at": &record.created_at,
                ":updated_at": &record.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, record: &DeveloperRecord) -> AppResult<()> {
        let updated = conn.execute(
            r#"
                UPDATE developers
                SET name = :name,
                    role = :role,
                    team_id = :team_id,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":role": &record.role,
                ":team_id": &record.team_id,
                ":updated_at": &record.updated_at,
            },
        )?;

        if updated == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<DeveloperRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;
        let developer = stmt
            .query_row(named_params! {":id": id}, map_developer)
            .optional()?;

        Ok(developer)
    }

    pub fn list(conn: &Connection, include_archived: bool) -> AppResult<Vec<DeveloperRecord>> {
        let sql = if include_archived {
            format!("{BASE_SELECT} ORDER BY created_at, id")
        } else {
            format!("{BASE_SELECT} WHERE archived_at IS NULL ORDER BY created_at, id")
        };

        let mut stmt = conn.prepare(&sql)?;
        let developers = stmt
            .query_map([], map_developer)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(developers)
    }

    pub fn list_archived(conn: &Connection) -> AppResult<Vec<DeveloperRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE archived_at IS NOT NULL ORDER BY archived_at DESC, id"
        ))?;
        let developers = stmt
            .query_map([], map_developer)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(developers)
    }

    pub fn list_active_by_team(conn: &Connection, team_id: &str) -> AppResult<Vec<DeveloperRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE team_id = :team_id AND archived_at IS NULL ORDER BY created_at, id"
        ))?;
        let developers = stmt
            .query_map(named_params! {":team_id": team_id}, map_developer)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(developers)
    }

    /// Archives or restores a developer. The guard on the current
    /// `archived_at` state makes the transition exclusive: the losing side
    /// of a concurrent archive/restore matches zero rows and the caller
    /// reports a conflict instead of silently re-applying.
    pub fn set_archived(
        conn: &Connection,
        id: &str,
        archived_at: Option<&str>,
        updated_at: &str,
    ) -> AppResult<usize> {
        let guard = if archived_at.is_some() {
            "archived_at IS NULL"
        } else {
            "archived_at IS NOT NULL"
        };

        let updated = conn.execute(
            &format!(
                r#"
                    UPDATE developers
                    SET archived_at = :archived_at,
                        updated_at = :updated_at
                    WHERE id = :id AND {guard}
                "#
            ),
            named_params! {
                ":id": id,
                ":archived_at": &archived_at,
                ":updated_at": updated_at,
            },
        )?;

        Ok(updated)
    }

    pub fn update_latest_score(
        conn: &Connection,
        id: &str,
        score: f64,
        updated_at: &str,
    ) -> AppResult<()> {
        let updated = conn.execute(
            r#"
                UPDATE developers
                SET latest_performance_score = :score,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": id,
                ":score": score,
                ":updated_at": updated_at,
            },
        )?;

        if updated == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    /// Detaches every developer of a team; part of the team deletion
    /// transaction so developers survive their team (no cascade delete).
    pub fn detach_team(conn: &Connection, team_id: &str, updated_at: &str) -> AppResult<usize> {
        let detached = conn.execute(
            r#"
                UPDATE developers
                SET team_id = NULL,
                    updated_at = :updated_at
                WHERE team_id = :team_id
            "#,
            named_params! {
                ":team_id": team_id,
                ":updated_at": updated_at,
            },
        )?;

        Ok(detached)
    }
}
