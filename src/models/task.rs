// src/models/task.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use super::project::ProjectWithClient;
use crate::domain::calendar::OnCalendar;
use crate::domain::coerce::{nullable, present};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Haute,
    #[default]
    Moyenne,
    Basse,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Haute => "Haute",
            Priority::Moyenne => "Moyenne",
            Priority::Basse => "Basse",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AsRef<Task> for Task {
    fn as_ref(&self) -> &Task {
        self
    }
}

impl OnCalendar for Task {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.due_date.map(|d| d.date_naive())
    }
}

/// Task with its project (and the project's client).
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub project: Option<ProjectWithClient>,
}

impl AsRef<Task> for TaskDetail {
    fn as_ref(&self) -> &Task {
        &self.task
    }
}

impl OnCalendar for TaskDetail {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.task.calendar_date()
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskSchema {
    #[validate(length(min = 1, max = 255, message = "Le titre de la tâche est requis"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub project_id: Value,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Value>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskSchema {
    #[validate(length(min = 1, max = 255, message = "Le titre de la tâche ne peut pas être vide"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub project_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Value>,
    pub completed: Option<bool>,
}

#[derive(Debug)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub project_id: i32,
    pub due_date: Option<DateTime<Utc>>,
}

/// Allow-listed task changes; `Some(None)` clears `description` or `due_date`.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub project_id: Option<i32>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
}
