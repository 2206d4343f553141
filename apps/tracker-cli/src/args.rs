//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracker_core::ApplicationStatus;

#[derive(Debug, Parser)]
#[command(name = "tracker", version, about = "Job application tracker")]
pub struct Cli {
    /// Config file (default: platform config dir / tracker.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local database file (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Track a new application
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        position: String,

        /// Date applied (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = ApplicationStatus::Applied)]
        status: ApplicationStatus,
    },

    /// List tracked applications
    List {
        #[arg(long)]
        json: bool,
    },

    /// Refresh every data source once
    Refresh {
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Upload unsynced applications
    Sync {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Refresh afterwards, as on sign-in
        #[arg(long)]
        then_refresh: bool,
    },

    /// Auto-refresh in the foreground until Ctrl-C
    Watch {
        /// Seconds between refreshes (default: stored preference)
        #[arg(long)]
        interval: Option<u64>,

        /// Start as if the window were hidden (every tick is skipped)
        #[arg(long)]
        hidden: bool,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Print refresh state, preference and pending uploads as JSON
    Status,

    /// Store the auto-refresh preference
    AutoRefresh {
        #[arg(value_enum)]
        toggle: Toggle,

        /// Seconds between refreshes
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct RemoteArgs {
    /// SQLite file standing in for the remote store
    #[arg(long)]
    pub mirror: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from([
            "tracker",
            "add",
            "--company",
            "Acme",
            "--position",
            "Engineer",
            "--date",
            "2026-03-01",
            "--status",
            "interview",
        ]);

        match cli.command {
            Command::Add { status, date, .. } => {
                assert_eq!(status, ApplicationStatus::Interviewing);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_auto_refresh() {
        let cli = Cli::parse_from(["tracker", "auto-refresh", "on", "--interval", "60"]);
        match cli.command {
            Command::AutoRefresh { toggle, interval } => {
                assert_eq!(toggle, Toggle::On);
                assert_eq!(interval, Some(60));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_db_flag() {
        let cli = Cli::parse_from(["tracker", "status", "--db", "/tmp/t.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
    }
}
