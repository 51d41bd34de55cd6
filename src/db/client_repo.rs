//! Repository for the `clients` table.

use sqlx::{PgConnection, PgExecutor};

use crate::models::client::{Client, CreateClientSchema, UpdateClientSchema};

const COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";

pub struct ClientRepo;

impl ClientRepo {
    /// All clients, most recently created first.
    pub async fn list<'e>(db: impl PgExecutor<'e>) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Client>(&query).fetch_all(db).await
    }

    pub async fn list_by_ids<'e>(
        db: impl PgExecutor<'e>,
        ids: &[i32],
    ) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = ANY($1)");
        sqlx::query_as::<_, Client>(&query).bind(ids).fetch_all(db).await
    }

    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        input: &CreateClientSchema,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (name, email, phone, address)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .fetch_one(db)
            .await
    }

    /// Applies the supplied fields; an explicit `null` clears a nullable column.
    /// `None` if the client does not exist.
    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateClientSchema,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($2, name),
                email = CASE WHEN $3 THEN $4 ELSE email END,
                phone = CASE WHEN $5 THEN $6 ELSE phone END,
                address = CASE WHEN $7 THEN $8 ELSE address END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.email.is_some())
            .bind(input.email.as_ref().and_then(Option::as_deref))
            .bind(input.phone.is_some())
            .bind(input.phone.as_ref().and_then(Option::as_deref))
            .bind(input.address.is_some())
            .bind(input.address.as_ref().and_then(Option::as_deref))
            .fetch_optional(db)
            .await
    }

    /// Deletes the client's tasks, then its projects, then the client.
    /// Returns `false` if the client did not exist.
    pub async fn delete_cascade(conn: &mut PgConnection, id: i32) -> Result<bool, sqlx::Error> {
        let tasks = sqlx::query(
            "DELETE FROM tasks WHERE project_id IN (SELECT id FROM projects WHERE client_id = $1)",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let projects = sqlx::query("DELETE FROM projects WHERE client_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            client_id = id,
            projects = projects.rows_affected(),
            tasks = tasks.rows_affected(),
            "client cascade"
        );
        Ok(result.rows_affected() > 0)
    }

    pub async fn count<'e>(db: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM clients").fetch_one(db).await
    }
}
