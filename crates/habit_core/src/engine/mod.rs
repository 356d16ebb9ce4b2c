//! Day-state engine.
//!
//! # Responsibility
//! - Derive the cycle phase from stored dates and the current instant.
//! - Enforce the one-log-per-calendar-day rule at write time.
//! - Produce the end-of-cycle summary.
//!
//! # Invariants
//! - Nothing in this module touches storage or reads the system clock.
//!
//! State machine (derived on every read, never stored):
//! `Setup -(start)-> Active -(7 days elapse)-> Completed -(start)-> Active`.

pub mod calendar;
pub mod day_state;
pub mod summary;

pub use calendar::{DayBoundary, DayBoundaryParseError};
pub use day_state::{
    append_log, can_log_today, compute_status, cycle_day_number, DuplicateDay, Status,
    CYCLE_LENGTH_DAYS,
};
pub use summary::{summarize, Insight, Summary};
