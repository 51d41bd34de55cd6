//! Repository for the `projects` table.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::models::project::{NewProject, Project, ProjectChanges, ProjectStatus};

const COLUMNS: &str =
    "id, name, description, status, progress, deadline, client_id, user_id, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// All projects, most recently created first.
    pub async fn list<'e>(db: impl PgExecutor<'e>) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(db).await
    }

    pub async fn find_by_id<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Projects whose deadline falls in `[from, to)`.
    pub async fn list_deadline_between<'e>(
        db: impl PgExecutor<'e>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE deadline >= $1 AND deadline < $2
             ORDER BY deadline, id"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(db)
            .await
    }

    /// Row-locks the project until the surrounding transaction ends, so that
    /// writes deriving from its task set run one at a time.
    pub async fn find_for_update<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_by_ids<'e>(
        db: impl PgExecutor<'e>,
        ids: &[i32],
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ANY($1)");
        sqlx::query_as::<_, Project>(&query).bind(ids).fetch_all(db).await
    }

    pub async fn list_for_clients<'e>(
        db: impl PgExecutor<'e>,
        client_ids: &[i32],
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE client_id = ANY($1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_ids)
            .fetch_all(db)
            .await
    }

    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        input: &NewProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, status, progress, deadline, client_id, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.progress)
            .bind(input.deadline)
            .bind(input.client_id)
            .bind(input.user_id)
            .fetch_one(db)
            .await
    }

    /// Applies the allow-listed changes. `None` if the project does not exist.
    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        changes: &ProjectChanges,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                progress = COALESCE($6, progress),
                deadline = CASE WHEN $7 THEN $8 ELSE deadline END,
                client_id = CASE WHEN $9 THEN $10 ELSE client_id END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(changes.description.is_some())
            .bind(changes.description.as_ref().and_then(Option::as_deref))
            .bind(changes.status.map(ProjectStatus::as_str))
            .bind(changes.progress)
            .bind(changes.deadline.is_some())
            .bind(changes.deadline.flatten())
            .bind(changes.client_id.is_some())
            .bind(changes.client_id.flatten())
            .fetch_optional(db)
            .await
    }

    pub async fn set_progress<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        progress: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET progress = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(progress)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Deletes the project's tasks, then the project.
    /// Returns `false` if the project did not exist.
    pub async fn delete_cascade(conn: &mut PgConnection, id: i32) -> Result<bool, sqlx::Error> {
        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(project_id = id, tasks = tasks.rows_affected(), "project cascade");
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_with_status<'e>(
        db: impl PgExecutor<'e>,
        status: ProjectStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(db)
            .await
    }
}
