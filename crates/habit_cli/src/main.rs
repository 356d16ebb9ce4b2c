//! `habit` command-line entry point.
//!
//! # Responsibility
//! - Parse one command, open one storage handle, run one service call.
//! - Print exactly one JSON envelope and exit non-zero on reported errors.
//!
//! # Invariants
//! - The storage handle lives only for the duration of the command.

mod api;
mod config;

use api::{Envelope, Payload, PingView, StatusView, STATUS_INTERNAL};
use clap::{ArgGroup, Parser, Subcommand};
use config::{CliConfig, GlobalArgs, StoreBackend};
use habit_core::db::open_db;
use habit_core::{
    core_version, init_logging, ping, HabitService, JsonFileRecordStore, RecordStore,
    SqliteRecordStore,
};
use log::{error, info};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "habit")]
#[command(about = "Commit to one small habit for seven days", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    #[command(flatten)]
    Device(DeviceCommand),

    /// Report that the core is reachable
    Ping,
}

/// Commands that act on one device record.
#[derive(Debug, Clone, Subcommand)]
enum DeviceCommand {
    /// Fetch the device record, creating it on first contact
    Init {
        #[arg(long, env = "HABIT_DEVICE_ID")]
        device: Option<String>,
    },

    /// Start a new 7-day cycle; clears previous logs
    Start {
        #[arg(long, env = "HABIT_DEVICE_ID")]
        device: Option<String>,

        /// Habit to commit to
        #[arg(long)]
        name: String,

        /// Smallest acceptable daily action
        #[arg(long = "min", value_name = "VERSION")]
        minimum_version: String,
    },

    /// Show the current cycle phase and day number
    Status {
        #[arg(long, env = "HABIT_DEVICE_ID")]
        device: Option<String>,
    },

    /// Record today's outcome (once per calendar day)
    #[command(group(ArgGroup::new("outcome").required(true).args(["done", "missed"])))]
    Log {
        #[arg(long, env = "HABIT_DEVICE_ID")]
        device: Option<String>,

        /// Today's minimum version was done
        #[arg(long)]
        done: bool,

        /// Today's minimum version was missed
        #[arg(long)]
        missed: bool,

        /// Optional note, usually why the day was missed
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Show the end-of-cycle summary
    Summary {
        #[arg(long, env = "HABIT_DEVICE_ID")]
        device: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Device(command) => command.name(),
            Self::Ping => "ping",
        }
    }
}

impl DeviceCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Start { .. } => "start",
            Self::Status { .. } => "status",
            Self::Log { .. } => "log",
            Self::Summary { .. } => "summary",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::resolve(cli.global);

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let envelope = run(&config, &cli.command);
    println!("{}", envelope.to_json());
    if envelope.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(config: &CliConfig, command: &Command) -> Envelope {
    info!(
        "event=cli_command module=cli status=start command={} store={:?} day_boundary={}",
        command.name(),
        config.store,
        config.day_boundary
    );

    let command = match command {
        Command::Device(command) => command,
        Command::Ping => {
            return Envelope::success(Payload::Ping(PingView {
                message: ping(),
                version: core_version(),
            }));
        }
    };

    match config.store {
        StoreBackend::Sqlite => {
            let conn = match open_db(&config.data_path) {
                Ok(conn) => conn,
                Err(err) => return storage_failure(&err),
            };
            match SqliteRecordStore::try_new(&conn) {
                Ok(store) => dispatch(&HabitService::new(store, config.day_boundary), command),
                Err(err) => storage_failure(&err),
            }
        }
        StoreBackend::Json => match JsonFileRecordStore::open(&config.data_path) {
            Ok(store) => dispatch(&HabitService::new(store, config.day_boundary), command),
            Err(err) => storage_failure(&err),
        },
    }
}

fn dispatch<S: RecordStore>(service: &HabitService<S>, command: &DeviceCommand) -> Envelope {
    let result = match command {
        DeviceCommand::Init { device } => service
            .init_or_fetch(device_arg(device))
            .map(Payload::Record),
        DeviceCommand::Start {
            device,
            name,
            minimum_version,
        } => service
            .start_habit(device_arg(device), name, minimum_version)
            .map(Payload::Record),
        DeviceCommand::Status { device } => service
            .status_report(device_arg(device))
            .map(|report| Payload::Status(StatusView::from(report))),
        DeviceCommand::Log {
            device,
            done,
            reason,
            ..
        } => service
            .log_today(device_arg(device), *done, reason)
            .map(Payload::Record),
        DeviceCommand::Summary { device } => service
            .get_summary(device_arg(device))
            .map(Payload::Summary),
    };

    match result {
        Ok(payload) => {
            info!(
                "event=cli_command module=cli status=ok command={}",
                command.name()
            );
            Envelope::success(payload)
        }
        Err(err) => {
            let envelope = Envelope::from_service_error(&err);
            info!(
                "event=cli_command module=cli status=error command={} status_code={}",
                command.name(),
                envelope.status
            );
            envelope
        }
    }
}

fn device_arg(device: &Option<String>) -> &str {
    device.as_deref().unwrap_or_default()
}

fn storage_failure(err: &dyn std::error::Error) -> Envelope {
    error!("event=store_open module=cli status=error error={err}");
    Envelope::failure(STATUS_INTERNAL, err.to_string())
}
