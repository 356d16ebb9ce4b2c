//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls and engine rules into use-case APIs.
//! - Keep CLI and other boundary layers decoupled from storage details.

pub mod habit_service;
