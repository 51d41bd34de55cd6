//! Repository for the `tasks` table.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::task::{NewTask, Priority, Task, TaskChanges};

const COLUMNS: &str =
    "id, title, description, priority, completed, due_date, project_id, created_at, updated_at";

pub struct TaskRepo;

impl TaskRepo {
    /// All tasks, most recently created first.
    pub async fn list<'e>(db: impl PgExecutor<'e>) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Task>(&query).fetch_all(db).await
    }

    /// Tasks due in `[from, to)`, soonest first.
    pub async fn list_due_between<'e>(
        db: impl PgExecutor<'e>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE due_date >= $1 AND due_date < $2
             ORDER BY due_date, id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(db)
            .await
    }

    pub async fn find_by_id<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_for_projects<'e>(
        db: impl PgExecutor<'e>,
        project_ids: &[i32],
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE project_id = ANY($1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_ids)
            .fetch_all(db)
            .await
    }

    pub async fn create<'e>(db: impl PgExecutor<'e>, input: &NewTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, priority, project_id, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority.as_str())
            .bind(input.project_id)
            .bind(input.due_date)
            .fetch_one(db)
            .await
    }

    /// Applies the allow-listed changes. `None` if the task does not exist.
    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                priority = COALESCE($5, priority),
                project_id = COALESCE($6, project_id),
                due_date = CASE WHEN $7 THEN $8 ELSE due_date END,
                completed = COALESCE($9, completed),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(changes.description.is_some())
            .bind(changes.description.as_ref().and_then(Option::as_deref))
            .bind(changes.priority.map(Priority::as_str))
            .bind(changes.project_id)
            .bind(changes.due_date.is_some())
            .bind(changes.due_date.flatten())
            .bind(changes.completed)
            .fetch_optional(db)
            .await
    }

    pub async fn complete_all_for_project<'e>(
        db: impl PgExecutor<'e>,
        project_id: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET completed = TRUE, updated_at = NOW()
             WHERE project_id = $1 AND completed = FALSE",
        )
        .bind(project_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// `(completed, total)` task counts of a project.
    pub async fn completion_counts<'e>(
        db: impl PgExecutor<'e>,
        project_id: i32,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE completed), COUNT(*)
             FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e>(db: impl PgExecutor<'e>, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_open<'e>(db: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE completed = FALSE")
            .fetch_one(db)
            .await
    }
}
