//! Domain model for habit cycles.
//!
//! # Responsibility
//! - Define the per-device record shape shared by engine, stores and service.
//!
//! # Invariants
//! - One record per device identifier.
//! - A record holds at most one habit at a time.

pub mod habit;

pub use habit::{DeviceId, DeviceRecord, Habit, LogEntry, ValidationError};
