// src/models/mod.rs
use serde::Serialize;

pub mod calendar;
pub mod client;
pub mod project;
pub mod supplier;
pub mod task;
pub mod user;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Dashboard counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Projects whose status is "En cours".
    pub projects_count: i64,
    pub clients_count: i64,
    /// Tasks not yet completed.
    pub tasks_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
