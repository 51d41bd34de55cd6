// src/handlers/projects.rs
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::Value;

use crate::db::{self, ProjectRepo, TaskRepo, UserRepo};
use crate::domain::{coerce, progress};
use crate::error::StoreContext;
use crate::handlers::users::default_user;
use crate::models::project::{
    CreateProjectSchema, NewProject, ProjectChanges, ProjectDetail, UpdateProjectSchema,
};
use crate::models::MessageResponse;
use crate::notify::templates;
use crate::validation::{IdParam, ValidatedJson};
use crate::{AppError, AppState};

const LIST_FAILED: &str = "Erreur lors de la récupération des projets";
const CREATE_FAILED: &str = "Erreur lors de la création du projet";
const UPDATE_FAILED: &str = "Erreur lors de la mise à jour du projet";
const DELETE_FAILED: &str = "Erreur lors de la suppression du projet";

fn not_found() -> AppError {
    AppError::NotFound("Projet introuvable".into())
}

// --- 1. 获取列表 (GET /projects) ---
pub async fn get_projects_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectDetail>>, AppError> {
    let projects = ProjectRepo::list(&state.db).await.context(LIST_FAILED)?;
    let details = db::load_project_details(&state.db, projects)
        .await
        .context(LIST_FAILED)?;
    Ok(Json(details))
}

// --- 2. 创建项目 (POST /projects) ---
pub async fn create_project_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateProjectSchema>,
) -> Result<(StatusCode, Json<ProjectDetail>), AppError> {
    // 先完整校验输入，再写库
    let client_id = match &body.client_id {
        Some(value) => coerce::nullable_id(value, "clientId")?,
        None => None,
    };
    let deadline = match &body.deadline {
        Some(value) => coerce::nullable_date(value, "deadline")?,
        None => None,
    };
    let status = body.status.unwrap_or_default();
    let supplied_progress = body.progress.as_ref().map(coerce::progress);

    let user_id = resolve_owner(&state, body.user_id.as_ref()).await?;

    let new_project = NewProject {
        name: body.name,
        description: body.description,
        status,
        progress: progress::initial_progress(status, supplied_progress),
        deadline,
        client_id,
        user_id,
    };

    let project = ProjectRepo::create(&state.db, &new_project)
        .await
        .context(CREATE_FAILED)?;
    tracing::info!(project_id = project.id, user_id, "project created");

    let detail = db::load_project_detail(&state.db, project)
        .await
        .context(CREATE_FAILED)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// The requested owner when that user exists, the default admin otherwise.
async fn resolve_owner(state: &AppState, requested: Option<&Value>) -> Result<i32, AppError> {
    let requested = requested
        .and_then(coerce::lenient_int)
        .and_then(|id| i32::try_from(id).ok());

    if let Some(id) = requested {
        if UserRepo::exists(&state.db, id).await.context(CREATE_FAILED)? {
            return Ok(id);
        }
        tracing::debug!(user_id = id, "unknown owner, falling back to the default admin");
    }

    Ok(default_user(&state.db).await?.id)
}

// --- 3. 更新项目 (PATCH /projects/:id) ---
pub async fn update_project_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateProjectSchema>,
) -> Result<Json<ProjectDetail>, AppError> {
    let client_id = body
        .client_id
        .as_ref()
        .map(|value| coerce::nullable_id(value, "clientId"))
        .transpose()?;
    let deadline = body
        .deadline
        .as_ref()
        .map(|value| coerce::nullable_date(value, "deadline"))
        .transpose()?;
    let supplied_progress = body.progress.as_ref().map(coerce::progress);

    let changes = ProjectChanges {
        name: body.name,
        description: body.description,
        status: body.status,
        progress: progress::patched_progress(body.status, supplied_progress),
        deadline,
        client_id,
    };

    let mut tx = state.db.begin().await.context(UPDATE_FAILED)?;

    let before = ProjectRepo::find_for_update(&mut *tx, id)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;

    if progress::completes_all_tasks(changes.status) {
        let completed = TaskRepo::complete_all_for_project(&mut *tx, id)
            .await
            .context(UPDATE_FAILED)?;
        tracing::debug!(project_id = id, completed, "project finished, tasks completed");
    }

    let project = ProjectRepo::update(&mut *tx, id, &changes)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;

    tx.commit().await.context(UPDATE_FAILED)?;

    let detail = db::load_project_detail(&state.db, project)
        .await
        .context(UPDATE_FAILED)?;

    if detail.project.is_finished() && !before.is_finished() {
        notify_project_finished(&state, &detail).await;
    }

    Ok(Json(detail))
}

async fn notify_project_finished(state: &AppState, detail: &ProjectDetail) {
    let Some(mailer) = &state.mailer else {
        return;
    };
    let Some(user_id) = detail.project.user_id else {
        return;
    };

    let user = match UserRepo::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(user_id, "could not load project owner for notification: {}", e);
            return;
        }
    };
    if !user.wants_project_mail() {
        return;
    }

    mailer.dispatch(templates::project_completed(
        &user,
        &detail.project,
        detail.client.as_ref(),
        Utc::now().date_naive(),
    ));
}

// --- 4. 删除项目 (DELETE /projects/:id) ---
pub async fn delete_project_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await.context(DELETE_FAILED)?;

    if !ProjectRepo::delete_cascade(&mut tx, id)
        .await
        .context(DELETE_FAILED)?
    {
        return Err(not_found());
    }

    tx.commit().await.context(DELETE_FAILED)?;
    tracing::info!(project_id = id, "project deleted");

    Ok(Json(MessageResponse {
        message: "Projet supprimé",
    }))
}
