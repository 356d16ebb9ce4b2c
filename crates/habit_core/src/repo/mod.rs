//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the read-by-key / overwrite-by-key contract over device records.
//! - Isolate SQLite and flat-file details from the service layer.
//!
//! # Invariants
//! - Backends are interchangeable: the service never branches on which one
//!   it holds.

pub mod json_file_repo;
pub mod record_repo;
pub mod sqlite_repo;
