//! Pure business rules, free of HTTP and storage concerns.

pub mod calendar;
pub mod coerce;
pub mod progress;
pub mod theme;
