// src/handlers/calendar.rs
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use crate::db::{self, ProjectRepo, TaskRepo};
use crate::domain::calendar::{self, GridDay};
use crate::error::StoreContext;
use crate::models::calendar::{CalendarCell, CalendarQuery, CalendarView, OutlookStatus};
use crate::outlook::{OutlookEvent, OutlookToken};
use crate::{AppError, AppState};

const LOAD_FAILED: &str = "Erreur lors du chargement du calendrier";

/// Month view: 42 day cells with their tasks, project deadlines and, when the
/// caller forwards an Outlook token, calendar events; plus the week's
/// upcoming tasks.
pub async fn get_calendar_handler(
    State(state): State<AppState>,
    outlook_token: Option<TypedHeader<OutlookToken>>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<CalendarView>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    let grid = calendar::month_grid(year, month)
        .ok_or_else(|| AppError::BadRequest("Mois invalide".into()))?;

    let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
        return Err(AppError::BadRequest("Mois invalide".into()));
    };
    // 任务范围同时覆盖网格和"即将到期"窗口
    let out_of_range = || AppError::BadRequest("Mois invalide".into());
    let horizon = today
        .checked_add_days(Days::new(calendar::UPCOMING_WINDOW_DAYS))
        .ok_or_else(out_of_range)?;
    let grid_end = last.date.succ_opt().ok_or_else(out_of_range)?;
    let task_end = horizon.succ_opt().ok_or_else(out_of_range)?.max(grid_end);

    let task_from = start_of(first.date.min(today));
    let (grid_from, grid_to, task_to) = (start_of(first.date), start_of(grid_end), start_of(task_end));

    let (tasks, projects) = tokio::try_join!(
        TaskRepo::list_due_between(&state.db, task_from, task_to),
        ProjectRepo::list_deadline_between(&state.db, grid_from, grid_to),
    )
    .context(LOAD_FAILED)?;
    let tasks = db::load_task_details(&state.db, tasks)
        .await
        .context(LOAD_FAILED)?;
    let projects = db::load_project_details(&state.db, projects)
        .await
        .context(LOAD_FAILED)?;

    let (events, outlook) = match outlook_token {
        Some(TypedHeader(OutlookToken(token))) => fetch_events(&state, &token, &grid).await,
        None => (Vec::new(), OutlookStatus::default()),
    };

    let days = grid
        .iter()
        .map(|day| CalendarCell {
            date: day.date,
            is_current_month: day.is_current_month,
            is_today: day.date == today,
            tasks: calendar::on_date(&tasks, day.date).into_iter().cloned().collect(),
            projects: calendar::on_date(&projects, day.date)
                .into_iter()
                .cloned()
                .collect(),
            events: calendar::on_date(&events, day.date)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect();

    let upcoming = calendar::upcoming(&tasks, today)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(CalendarView {
        year,
        month,
        days,
        upcoming,
        outlook,
    }))
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

async fn fetch_events(
    state: &AppState,
    token: &str,
    grid: &[GridDay],
) -> (Vec<OutlookEvent>, OutlookStatus) {
    let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
        return (Vec::new(), OutlookStatus::default());
    };
    let (from, to): (NaiveDate, NaiveDate) = (first.date, last.date);

    match state.outlook.calendar_view(token, from, to).await {
        Ok(events) => {
            tracing::debug!(count = events.len(), %from, %to, "outlook events fetched");
            (
                events,
                OutlookStatus {
                    connected: true,
                    error: None,
                },
            )
        }
        Err(e) => {
            tracing::warn!("outlook calendar fetch failed: {}", e);
            (
                Vec::new(),
                OutlookStatus {
                    connected: false,
                    error: Some(e.to_string()),
                },
            )
        }
    }
}
