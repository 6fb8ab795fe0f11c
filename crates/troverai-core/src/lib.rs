//! Core schedule logic for troverai.
//!
//! Holds the schedule data model, the error taxonomy shared by all crates,
//! and the pure date resolution and filtering stages applied to a fetched
//! day of programs.

/// Date token resolution (`oggi`, `+1`, `16-01-2026`, ...).
pub mod date;
/// Schedule data model.
pub mod entry;
mod error;
/// Typology, genre and title filtering.
pub mod program;
/// End-time inference and time-window filtering.
pub mod window;

pub use date::{DateSpec, resolve_date};
pub use entry::{ChannelInfo, DaySchedule, ScheduleEntry};
pub use error::{Error, Result};
pub use program::ProgramFilter;
pub use window::{TimeWindow, filter_by_time, infer_end_times, parse_time_token};
