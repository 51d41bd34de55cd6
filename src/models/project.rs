// src/models/project.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use super::client::Client;
use super::task::Task;
use crate::domain::calendar::OnCalendar;
use crate::domain::coerce::{nullable, present};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "En cours")]
    EnCours,
    #[serde(rename = "En attente")]
    EnAttente,
    #[serde(rename = "Terminé")]
    Termine,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::EnCours => "En cours",
            ProjectStatus::EnAttente => "En attente",
            ProjectStatus::Termine => "Terminé",
        }
    }

    pub fn is_finished(self) -> bool {
        self == ProjectStatus::Termine
    }
}

// --- Row ---

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub progress: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub client_id: Option<i32>,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_finished(&self) -> bool {
        self.status == ProjectStatus::Termine.as_str()
    }
}

impl OnCalendar for Project {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.deadline.map(|d| d.date_naive())
    }
}

/// Project with its client and tasks, as returned by the project routes.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub client: Option<Client>,
    pub tasks: Vec<Task>,
}

impl OnCalendar for ProjectDetail {
    fn calendar_date(&self) -> Option<NaiveDate> {
        self.project.calendar_date()
    }
}

/// Project with its client, as nested under a task.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithClient {
    #[serde(flatten)]
    pub project: Project,
    pub client: Option<Client>,
}

// --- Request bodies ---
// Numeric and date fields arrive as raw JSON and go through `domain::coerce`.

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectSchema {
    #[validate(length(min = 1, max = 200, message = "Le nom du projet est requis"))]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "present")]
    pub progress: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub client_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Value>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectSchema {
    #[validate(length(min = 1, max = 200, message = "Le nom du projet ne peut pas être vide"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "present")]
    pub progress: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub client_id: Option<Value>,
}

// --- Resolved writes ---

#[derive(Debug)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub progress: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub client_id: Option<i32>,
    pub user_id: i32,
}

/// Allow-listed project changes. Outer `None` leaves a column untouched;
/// for nullable columns `Some(None)` clears it.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i32>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub client_id: Option<Option<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_french_labels() {
        assert_eq!(serde_json::to_string(&ProjectStatus::Termine).unwrap(), "\"Terminé\"");
        let parsed: ProjectStatus = serde_json::from_str("\"En attente\"").unwrap();
        assert_eq!(parsed, ProjectStatus::EnAttente);
        assert!(serde_json::from_str::<ProjectStatus>("\"Fini\"").is_err());
    }

    #[test]
    fn update_body_distinguishes_null_from_absent() {
        let body: UpdateProjectSchema =
            serde_json::from_str(r#"{"clientId": null, "status": "Terminé"}"#).unwrap();
        assert_eq!(body.client_id, Some(Value::Null));
        assert!(body.deadline.is_none());
        assert_eq!(body.status, Some(ProjectStatus::Termine));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let body: UpdateProjectSchema =
            serde_json::from_str(r#"{"userId": 9, "createdAt": "2020-01-01"}"#).unwrap();
        assert!(body.name.is_none());
        assert!(body.progress.is_none());
    }
}
