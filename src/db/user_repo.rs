//! Repository for the `users` table. Each settings group has its own update.

use sqlx::PgExecutor;

use crate::models::user::{
    UpdateAppearanceSchema, UpdateGeneralSchema, UpdateNotificationsSchema, UpdateProfileSchema,
    User,
};

const COLUMNS: &str = "id, name, email, password, phone, role, theme, primary_color, language, \
     timezone, email_notifications, project_notifications, task_notifications, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn find_by_id<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_email<'e>(
        db: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(db)
            .await
    }

    /// Inserts the user unless the email is taken; either way returns the
    /// row stored under that email. The existing row is never modified.
    pub async fn insert_or_get<'e>(
        db: impl PgExecutor<'e>,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let query = format!(
            "INSERT INTO users (name, email, password, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(db)
            .await
    }

    pub async fn exists<'e>(db: impl PgExecutor<'e>, id: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
    }

    pub async fn update_profile<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateProfileSchema,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.phone.is_some())
            .bind(input.phone.as_ref().and_then(Option::as_deref))
            .fetch_optional(db)
            .await
    }

    pub async fn update_notifications<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateNotificationsSchema,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email_notifications = COALESCE($2, email_notifications),
                project_notifications = COALESCE($3, project_notifications),
                task_notifications = COALESCE($4, task_notifications),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.email_notifications)
            .bind(input.project_notifications)
            .bind(input.task_notifications)
            .fetch_optional(db)
            .await
    }

    pub async fn update_password<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_appearance<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateAppearanceSchema,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                theme = COALESCE($2, theme),
                primary_color = COALESCE($3, primary_color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.theme.map(|t| t.as_str()))
            .bind(input.primary_color.map(|c| c.as_str()))
            .fetch_optional(db)
            .await
    }

    pub async fn update_general<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateGeneralSchema,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                language = COALESCE($2, language),
                timezone = COALESCE($3, timezone),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.language)
            .bind(&input.timezone)
            .fetch_optional(db)
            .await
    }
}
