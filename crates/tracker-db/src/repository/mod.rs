//! # Repository Module
//!
//! Database repository implementations for the tracker.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command / SyncReconciler                                          │
//! │       │                                                                 │
//! │       │  db.applications().list()                                      │
//! │       ▼                                                                 │
//! │  ApplicationRepository                                                 │
//! │  ├── list(&self)                                                       │
//! │  ├── insert(&self, new)                                                │
//! │  ├── mark_synced(&self, id, cloud_id)                                  │
//! │  └── import(&self, record)                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`application::ApplicationRepository`] - Application records and sync flags

pub mod application;
