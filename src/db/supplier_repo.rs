//! Repository for the `suppliers` table.

use sqlx::PgExecutor;

use crate::models::supplier::{CreateSupplierSchema, Supplier, UpdateSupplierSchema};

const COLUMNS: &str = "id, name, email, phone, category, created_at, updated_at";

pub struct SupplierRepo;

impl SupplierRepo {
    pub async fn list<'e>(db: impl PgExecutor<'e>) -> Result<Vec<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Supplier>(&query).fetch_all(db).await
    }

    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        input: &CreateSupplierSchema,
    ) -> Result<Supplier, sqlx::Error> {
        let query = format!(
            "INSERT INTO suppliers (name, email, phone, category)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.category)
            .fetch_one(db)
            .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: i32,
        input: &UpdateSupplierSchema,
    ) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!(
            "UPDATE suppliers SET
                name = COALESCE($2, name),
                email = CASE WHEN $3 THEN $4 ELSE email END,
                phone = CASE WHEN $5 THEN $6 ELSE phone END,
                category = CASE WHEN $7 THEN $8 ELSE category END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.email.is_some())
            .bind(input.email.as_ref().and_then(Option::as_deref))
            .bind(input.phone.is_some())
            .bind(input.phone.as_ref().and_then(Option::as_deref))
            .bind(input.category.is_some())
            .bind(input.category.as_ref().and_then(Option::as_deref))
            .fetch_optional(db)
            .await
    }

    pub async fn delete<'e>(db: impl PgExecutor<'e>, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
