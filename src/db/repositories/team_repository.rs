use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::team::TeamRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        description,
        color,
        created_at
    FROM teams
"#;

fn map_team(row: &Row<'_>) -> rusqlite::Result<TeamRecord> {
    Ok(TeamRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}

pub struct TeamRepository;

impl TeamRepository {
    pub fn insert(conn: &Connection, record: &TeamRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO teams (id, name, description, color, created_at)
                VALUES (:id, :name, :description, :color, :created_at)
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":description": &record.description,
                ":color": &record.color,
                ":created_at": &record.created_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, record: &TeamRecord) -> AppResult<()> {
        let updated = conn.execute(
            r#"
                UPDATE teams
                SET name = :name,
                    description = :description,
                    color = :color
                WHERE id = :id
            "#,
            named_params! {
                ":id": &record.id,
                ":name": &record.name,
                ":description": &record.description,
                ":color": &record.color,
            },
        )?;

        if updated == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let deleted = conn.execute("DELETE FROM teams WHERE id = :id", named_params! {":id": id})?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<TeamRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;
        let team = stmt
            .query_row(named_params! {":id": id}, map_team)
            .optional()?;

        Ok(team)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<TeamRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY created_at, id"))?;
        let teams = stmt
            .query_map([], map_team)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(teams)
    }
}
