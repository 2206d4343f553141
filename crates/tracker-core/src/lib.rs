//! # tracker-core: Pure Domain Types for the Tracker
//!
//! This crate holds the domain model shared by the local store and the
//! refresh/sync orchestration layer. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tracker Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Layer (forms, charts, toasts)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tracker-sync                                 │   │
//! │  │    RefreshCoordinator, Scheduler, SyncReconciler, Toasts        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tracker-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ analytics │  │   error   │  │ validation│  │   │
//! │  │   │  Record   │  │ Analytics │  │ ErrorKind │  │ NewApp    │  │   │
//! │  │   │  State    │  │ compute() │  │ Refresh-  │  │ dup key   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tracker-db (SQLite local store)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records, refresh state, toast enums, preferences
//! - [`error`] - Error taxonomy (`ErrorKind`, `RefreshError`) and domain errors
//! - [`analytics`] - Pure analytics computation (the local fallback)
//! - [`validation`] - New-application validation and duplicate keys
//!
//! ## Example Usage
//!
//! ```rust
//! use tracker_core::{ErrorKind, RefreshError};
//!
//! // Untyped messages from legacy collaborators are classified by content.
//! let err = RefreshError::from_message("network unreachable");
//! assert_eq!(err.kind, ErrorKind::Network);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{Analytics, AnalyticsSource};
pub use error::{CoreError, CoreResult, ErrorKind, RefreshError, ValidationError};
pub use types::*;
pub use validation::{DuplicateKey, NewApplication};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default auto-refresh interval offered before the user picks one.
pub const DEFAULT_AUTO_REFRESH_INTERVAL_SECS: u64 = 30;

/// Most toasts on screen at once.
pub const MAX_VISIBLE_TOASTS: usize = 3;

/// Maximum length of company and position names.
pub const MAX_NAME_LENGTH: usize = 200;
