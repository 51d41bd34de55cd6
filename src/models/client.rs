// src/models/client.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::project::Project;
use crate::domain::coerce::nullable;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client as listed, with the projects it owns.
#[derive(Debug, Serialize)]
pub struct ClientWithProjects {
    #[serde(flatten)]
    pub client: Client,
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientSchema {
    #[validate(length(min = 1, max = 200, message = "Le nom du client est requis"))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientSchema {
    #[validate(length(min = 1, max = 200, message = "Le nom du client ne peut pas être vide"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
}
