//! # tracker-db: Local Store for the Tracker
//!
//! SQLite storage for application records, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tracker Data Flow                                │
//! │                                                                         │
//! │  Form submit / SyncReconciler                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tracker-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(application.rs) │   │  (embedded)  │  │   │
//! │  │   │               │    │                 │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Application-    │   │ 001_apps.sql │  │   │
//! │  │   │ Connection    │    │ Repository      │   │ ...          │  │   │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/tracker.db                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tracker_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tracker.db")).await?;
//! let pending = db.applications().count_pending().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::application::ApplicationRepository;
