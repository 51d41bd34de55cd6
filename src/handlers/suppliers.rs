// src/handlers/suppliers.rs
use axum::{extract::State, http::StatusCode, Json};

use crate::db::SupplierRepo;
use crate::error::StoreContext;
use crate::models::supplier::{CreateSupplierSchema, Supplier, UpdateSupplierSchema};
use crate::models::MessageResponse;
use crate::validation::{IdParam, ValidatedJson};
use crate::{AppError, AppState};

const LIST_FAILED: &str = "Erreur lors de la récupération des fournisseurs";
const CREATE_FAILED: &str = "Erreur lors de la création du fournisseur";
const UPDATE_FAILED: &str = "Erreur lors de la mise à jour du fournisseur";
const DELETE_FAILED: &str = "Erreur lors de la suppression du fournisseur";

fn not_found() -> AppError {
    AppError::NotFound("Fournisseur introuvable".into())
}

pub async fn get_suppliers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let suppliers = SupplierRepo::list(&state.db).await.context(LIST_FAILED)?;
    Ok(Json(suppliers))
}

pub async fn create_supplier_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateSupplierSchema>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let supplier = SupplierRepo::create(&state.db, &body)
        .await
        .context(CREATE_FAILED)?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateSupplierSchema>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = SupplierRepo::update(&state.db, id, &body)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;
    Ok(Json(supplier))
}

pub async fn delete_supplier_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    if !SupplierRepo::delete(&state.db, id).await.context(DELETE_FAILED)? {
        return Err(not_found());
    }

    Ok(Json(MessageResponse {
        message: "Fournisseur supprimé",
    }))
}
