//! Runtime configuration resolved from flags and `HABIT_*` environment
//! variables.

use clap::{Args, ValueEnum};
use habit_core::{default_log_level, DayBoundary};
use std::path::PathBuf;

/// Which record store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// SQLite database file.
    Sqlite,
    /// Single JSON document keyed by device id.
    Json,
}

impl StoreBackend {
    fn default_data_path(self) -> PathBuf {
        match self {
            Self::Sqlite => PathBuf::from("habit.sqlite3"),
            Self::Json => PathBuf::from("habit.json"),
        }
    }
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Storage backend
    #[arg(long, value_enum, env = "HABIT_STORE", default_value_t = StoreBackend::Sqlite, global = true)]
    pub store: StoreBackend,

    /// Database or JSON file path (defaults to ./habit.sqlite3 or ./habit.json)
    #[arg(long, value_name = "PATH", env = "HABIT_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Where calendar days start: local, utc, or a fixed offset like +09:00
    #[arg(long, value_name = "BOUNDARY", env = "HABIT_DAY_BOUNDARY", default_value = "local", global = true)]
    pub day_boundary: DayBoundary,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, value_name = "LEVEL", env = "HABIT_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, value_name = "DIR", env = "HABIT_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub store: StoreBackend,
    pub data_path: PathBuf,
    pub day_boundary: DayBoundary,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn resolve(args: GlobalArgs) -> Self {
        Self {
            store: args.store,
            data_path: args
                .data
                .unwrap_or_else(|| args.store.default_data_path()),
            day_boundary: args.day_boundary,
            log_level: args
                .log_level
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: args.log_dir,
        }
    }
}
