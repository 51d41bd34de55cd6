// src/handlers/tasks.rs
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::db::{self, ProjectRepo, TaskRepo, UserRepo};
use crate::domain::{coerce, progress};
use crate::error::StoreContext;
use crate::models::task::{CreateTaskSchema, NewTask, TaskChanges, TaskDetail, UpdateTaskSchema};
use crate::models::MessageResponse;
use crate::notify::templates;
use crate::validation::{IdParam, ValidatedJson};
use crate::{AppError, AppState};

const LIST_FAILED: &str = "Erreur lors de la récupération des tâches";
const CREATE_FAILED: &str = "Erreur lors de la création de la tâche";
const UPDATE_FAILED: &str = "Erreur lors de la mise à jour de la tâche";
const DELETE_FAILED: &str = "Erreur lors de la suppression de la tâche";

fn not_found() -> AppError {
    AppError::NotFound("Tâche introuvable".into())
}

// --- 1. 获取列表 (GET /tasks) ---
pub async fn get_tasks_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskDetail>>, AppError> {
    let tasks = TaskRepo::list(&state.db).await.context(LIST_FAILED)?;
    let details = db::load_task_details(&state.db, tasks)
        .await
        .context(LIST_FAILED)?;
    Ok(Json(details))
}

// --- 2. 创建任务 (POST /tasks) ---
pub async fn create_task_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateTaskSchema>,
) -> Result<(StatusCode, Json<TaskDetail>), AppError> {
    let project_id = coerce::required_id(&body.project_id, "projectId")?;
    let due_date = match &body.due_date {
        Some(value) => coerce::nullable_date(value, "dueDate")?,
        None => None,
    };

    let new_task = NewTask {
        title: body.title,
        description: body.description,
        priority: body.priority.unwrap_or_default(),
        project_id,
        due_date,
    };

    // projectId 不存在时外键报错，返回 400
    let task = TaskRepo::create(&state.db, &new_task)
        .await
        .context(CREATE_FAILED)?;
    tracing::info!(task_id = task.id, project_id, "task created");

    let detail = db::load_task_detail(&state.db, task)
        .await
        .context(CREATE_FAILED)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// --- 3. 更新任务 (PATCH /tasks/:id) ---
// 只要请求带 `completed`，就在同一事务内按当前任务集重算项目进度
pub async fn update_task_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateTaskSchema>,
) -> Result<Json<TaskDetail>, AppError> {
    let project_id = body
        .project_id
        .as_ref()
        .map(|value| coerce::required_id(value, "projectId"))
        .transpose()?;
    let due_date = body
        .due_date
        .as_ref()
        .map(|value| coerce::nullable_date(value, "dueDate"))
        .transpose()?;

    let changes = TaskChanges {
        title: body.title,
        description: body.description,
        priority: body.priority,
        project_id,
        due_date,
        completed: body.completed,
    };

    let mut tx = state.db.begin().await.context(UPDATE_FAILED)?;

    let before = TaskRepo::find_by_id(&mut *tx, id)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;

    // 先锁住父项目：同一项目的并发勾选按顺序重算进度
    if changes.completed.is_some() {
        let project_id = changes.project_id.unwrap_or(before.project_id);
        ProjectRepo::find_for_update(&mut *tx, project_id)
            .await
            .context(UPDATE_FAILED)?;
    }

    let task = TaskRepo::update(&mut *tx, id, &changes)
        .await
        .context(UPDATE_FAILED)?
        .ok_or_else(not_found)?;

    if changes.completed.is_some() {
        let (completed, total) = TaskRepo::completion_counts(&mut *tx, task.project_id)
            .await
            .context(UPDATE_FAILED)?;
        if let Some(value) = progress::progress_from_tasks(completed, total) {
            ProjectRepo::set_progress(&mut *tx, task.project_id, value)
                .await
                .context(UPDATE_FAILED)?;
            tracing::debug!(project_id = task.project_id, progress = value, "project progress recomputed");
        }
    }

    tx.commit().await.context(UPDATE_FAILED)?;

    let just_completed = task.completed && !before.completed;
    let detail = db::load_task_detail(&state.db, task)
        .await
        .context(UPDATE_FAILED)?;

    if just_completed {
        notify_task_completed(&state, &detail).await;
    }

    Ok(Json(detail))
}

async fn notify_task_completed(state: &AppState, detail: &TaskDetail) {
    let Some(mailer) = &state.mailer else {
        return;
    };
    let Some(project) = detail.project.as_ref().map(|p| &p.project) else {
        return;
    };
    let Some(user_id) = project.user_id else {
        return;
    };

    let user = match UserRepo::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(user_id, "could not load task owner for notification: {}", e);
            return;
        }
    };
    if !user.wants_task_mail() {
        return;
    }

    mailer.dispatch(templates::task_completed(
        &user,
        &detail.task,
        Some(project),
        Utc::now().date_naive(),
    ));
}

// --- 4. 删除任务 (DELETE /tasks/:id) ---
// 不重算项目进度
pub async fn delete_task_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, AppError> {
    if !TaskRepo::delete(&state.db, id).await.context(DELETE_FAILED)? {
        return Err(not_found());
    }
    tracing::info!(task_id = id, "task deleted");

    Ok(Json(MessageResponse {
        message: "Tâche supprimée",
    }))
}
