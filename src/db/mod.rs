//! Store access: one repository per table plus the relation loaders that
//! assemble the nested JSON shapes the routes return.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::client::{Client, ClientWithProjects};
use crate::models::project::{Project, ProjectDetail, ProjectWithClient};
use crate::models::task::{Task, TaskDetail};

pub mod client_repo;
pub mod project_repo;
pub mod supplier_repo;
pub mod task_repo;
pub mod user_repo;

pub use client_repo::ClientRepo;
pub use project_repo::ProjectRepo;
pub use supplier_repo::SupplierRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;

/// Attaches each project's client and tasks, keeping the input order.
pub async fn load_project_details(
    pool: &PgPool,
    projects: Vec<Project>,
) -> Result<Vec<ProjectDetail>, sqlx::Error> {
    let project_ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let clients = clients_by_id(pool, projects.iter().filter_map(|p| p.client_id)).await?;

    let mut tasks: HashMap<i32, Vec<Task>> = HashMap::new();
    for task in TaskRepo::list_for_projects(pool, &project_ids).await? {
        tasks.entry(task.project_id).or_default().push(task);
    }

    Ok(projects
        .into_iter()
        .map(|project| ProjectDetail {
            client: project.client_id.and_then(|id| clients.get(&id).cloned()),
            tasks: tasks.remove(&project.id).unwrap_or_default(),
            project,
        })
        .collect())
}

pub async fn load_project_detail(
    pool: &PgPool,
    project: Project,
) -> Result<ProjectDetail, sqlx::Error> {
    load_project_details(pool, vec![project])
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)
}

/// Attaches each task's project and that project's client.
pub async fn load_task_details(
    pool: &PgPool,
    tasks: Vec<Task>,
) -> Result<Vec<TaskDetail>, sqlx::Error> {
    let mut project_ids: Vec<i32> = tasks.iter().map(|t| t.project_id).collect();
    project_ids.sort_unstable();
    project_ids.dedup();

    let projects = ProjectRepo::list_by_ids(pool, &project_ids).await?;
    let clients = clients_by_id(pool, projects.iter().filter_map(|p| p.client_id)).await?;
    let projects: HashMap<i32, ProjectWithClient> = projects
        .into_iter()
        .map(|project| {
            let client = project.client_id.and_then(|id| clients.get(&id).cloned());
            (project.id, ProjectWithClient { project, client })
        })
        .collect();

    Ok(tasks
        .into_iter()
        .map(|task| TaskDetail {
            project: projects.get(&task.project_id).cloned(),
            task,
        })
        .collect())
}

pub async fn load_task_detail(pool: &PgPool, task: Task) -> Result<TaskDetail, sqlx::Error> {
    load_task_details(pool, vec![task])
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)
}

/// Attaches each client's projects (most recent first).
pub async fn load_client_projects(
    pool: &PgPool,
    clients: Vec<Client>,
) -> Result<Vec<ClientWithProjects>, sqlx::Error> {
    let client_ids: Vec<i32> = clients.iter().map(|c| c.id).collect();

    let mut projects: HashMap<i32, Vec<Project>> = HashMap::new();
    for project in ProjectRepo::list_for_clients(pool, &client_ids).await? {
        if let Some(client_id) = project.client_id {
            projects.entry(client_id).or_default().push(project);
        }
    }

    Ok(clients
        .into_iter()
        .map(|client| ClientWithProjects {
            projects: projects.remove(&client.id).unwrap_or_default(),
            client,
        })
        .collect())
}

async fn clients_by_id(
    pool: &PgPool,
    ids: impl Iterator<Item = i32>,
) -> Result<HashMap<i32, Client>, sqlx::Error> {
    let mut ids: Vec<i32> = ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    ids.sort_unstable();
    ids.dedup();

    Ok(ClientRepo::list_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}
