// src/handlers/clients.rs
use axum::{extract::State, http::StatusCode, Json};

use crate::db::{self, ClientRepo};
use crate::error::StoreContext;
use crate::models::client::{Client, ClientWithProjects, CreateClientSchema, UpdateClientSchema};
use crate::models::MessageResponse;
use crate::validation::{IdParam, ValidatedJson};
use crate::{AppError, AppState};

const LIST_FAILED: &str = "Erreur lors de la récupération des clients";
const CREATE_FAILED: &str = "Erreur lors de la création du client";
const UPDATE_FAILED: &str = "Erreur lors de la mise à jour du client";
const DELETE_FAILED: &str = "Erreur lors de la suppression du client";

fn not_found() -> AppError {
    AppError::NotFound("Client introuvable".into())
}

pub async fn get_clients_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientWithProjects>>, AppError> {
    let clients = ClientRepo::list(&state.db).await.context(LIST_FAILED)?;
    let clients = db::load_client_projects(&state.db, clients)
        .await
        .context(LIST_FAILED)?;
    Ok(Json(clients))
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateClientSchema>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = ClientRepo::create(&state.db, &body)
        .await
        .context(CREATE_FAILED)?;
    tracing::info!(client_id = client.id, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateClientSchema>,
) -> Result<Json<Client>, AppError> {
    let client = ClientRepo::update(&state.db, id, &body)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;
    Ok(Json(client))
}

/// Removes the client together with its projects and their tasks.
pub async fn delete_client_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await.context(DELETE_FAILED)?;

    if !ClientRepo::delete_cascade(&mut tx, id)
        .await
        .context(DELETE_FAILED)?
    {
        return Err(not_found());
    }

    tx.commit().await.context(DELETE_FAILED)?;
    tracing::info!(client_id = id, "client deleted");

    Ok(Json(MessageResponse {
        message: "Client supprimé",
    }))
}
