// src/models/calendar.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::project::ProjectDetail;
use super::task::TaskDetail;
use crate::outlook::OutlookEvent;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    /// 1-based.
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub tasks: Vec<TaskDetail>,
    pub projects: Vec<ProjectDetail>,
    pub events: Vec<OutlookEvent>,
}

/// Outcome of the Outlook fetch for this view.
#[derive(Debug, Default, Serialize)]
pub struct OutlookStatus {
    pub connected: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarCell>,
    pub upcoming: Vec<TaskDetail>,
    pub outlook: OutlookStatus,
}
