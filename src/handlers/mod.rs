// src/handlers/mod.rs
use axum::{extract::State, Json};

use crate::db::{ClientRepo, ProjectRepo, TaskRepo};
use crate::error::StoreContext;
use crate::models::project::ProjectStatus;
use crate::models::{HealthResponse, Stats};
use crate::{AppError, AppState};

pub mod calendar;
pub mod clients;
pub mod projects;
pub mod suppliers;
pub mod tasks;
pub mod users;

pub use calendar::*;
pub use clients::*;
pub use projects::*;
pub use suppliers::*;
pub use tasks::*;
pub use users::*;

// --- 健康检查 (GET /health) ---
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "API fonctionne correctement",
    })
}

// --- 统计 (GET /stats) ---
pub async fn get_stats_handler(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
    let (projects_count, clients_count, tasks_count) = tokio::try_join!(
        ProjectRepo::count_with_status(&state.db, ProjectStatus::EnCours),
        ClientRepo::count(&state.db),
        TaskRepo::count_open(&state.db),
    )
    .context("Erreur lors de la récupération des statistiques")?;

    Ok(Json(Stats {
        projects_count,
        clients_count,
        tasks_count,
    }))
}

// --- 未知路由 ---
pub async fn not_found_handler() -> AppError {
    AppError::NotFound("Route introuvable".into())
}
