//! # CLI Error Type
//!
//! ```text
//! DbError   ──┐
//! SyncError ──┼──▶ CliError ──▶ main ──▶ stderr, exit code 1
//! io / json ──┘
//! ```

use thiserror::Error;
use tracker_db::DbError;
use tracker_sync::SyncError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Could not determine a data directory; pass --db")]
    NoDataDir,

    #[error("`{0}` needs a remote; pass --mirror <PATH>")]
    MirrorRequired(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output failed: {0}")]
    Output(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
