//! Month grid and date bucketing for the calendar view.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::task::Task;

pub const WEEKS: usize = 6;
pub const GRID_CELLS: usize = WEEKS * 7;
pub const UPCOMING_WINDOW_DAYS: u64 = 7;
pub const UPCOMING_LIMIT: usize = 5;

/// Anything that can be placed on a calendar day.
pub trait OnCalendar {
    fn calendar_date(&self) -> Option<NaiveDate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
}

/// 6 × 7 Sunday-first grid covering `month` (1-based) of `year`, padded with
/// the tail of the previous month and the head of the next one.
///
/// Returns `None` for an invalid month.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<GridDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(lead))?;

    (0..GRID_CELLS as u64)
        .map(|offset| {
            start.checked_add_days(Days::new(offset)).map(|date| GridDay {
                date,
                is_current_month: date.year() == year && date.month() == month,
            })
        })
        .collect()
}

/// Items falling on `date`, in input order.
pub fn on_date<T: OnCalendar>(items: &[T], date: NaiveDate) -> Vec<&T> {
    items
        .iter()
        .filter(|item| item.calendar_date() == Some(date))
        .collect()
}

/// Open tasks due between `today` and a week later (both inclusive), soonest
/// first, at most [`UPCOMING_LIMIT`].
pub fn upcoming<T>(tasks: &[T], today: NaiveDate) -> Vec<&T>
where
    T: AsRef<Task>,
{
    let Some(horizon) = today.checked_add_days(Days::new(UPCOMING_WINDOW_DAYS)) else {
        return Vec::new();
    };

    let mut due: Vec<&T> = tasks
        .iter()
        .filter(|t| {
            let task = t.as_ref();
            !task.completed
                && task
                    .calendar_date()
                    .is_some_and(|d| d >= today && d <= horizon)
        })
        .collect();
    due.sort_by_key(|t| t.as_ref().due_date);
    due.truncate(UPCOMING_LIMIT);
    due
}
