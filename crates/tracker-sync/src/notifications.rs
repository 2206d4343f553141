//! # Notification Center
//!
//! Deduplicated, rate-limited status messages ("toasts").
//!
//! ## Publish Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        publish(toast)                                   │
//! │                                                                         │
//! │  (kind, message) seen < 2s ago? ──── yes ──▶ suppressed (None)         │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  category = explicit ∨ keyword match                                   │
//! │  category shown < cooldown ago? ──── yes ──▶ suppressed (None)         │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  stamp category + key, prune ledger entries older than 1h              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  visible: drop entries older than 30s, push, keep newest 3             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  spawn auto-remove after duration (5s default, 0 = sticky)             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Some(ToastId)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Suppression is not an error; callers never need to handle it.
//!
//! All timing uses `tokio::time::Instant`, so paused-clock tests see the
//! same windows production does.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use tracker_core::{ToastCategory, ToastKind, MAX_VISIBLE_TOASTS};

use crate::events::{NoOpEmitter, UiEventEmitter};

// =============================================================================
// Settings
// =============================================================================

/// Tunables for the notification center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Identical (kind, message) pairs within this window are suppressed.
    pub dedup_window: Duration,

    /// Visible toasts older than this are pruned on the next publish.
    pub cleanup_threshold: Duration,

    /// Maximum visible toasts, never above [`MAX_VISIBLE_TOASTS`].
    pub max_visible: usize,

    /// Auto-remove delay for toasts that don't specify one.
    pub default_duration: Duration,

    /// How long ledger entries are retained.
    pub ledger_retention: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            dedup_window: Duration::from_millis(2000),
            cleanup_threshold: Duration::from_secs(30),
            max_visible: MAX_VISIBLE_TOASTS,
            default_duration: Duration::from_millis(5000),
            ledger_retention: Duration::from_secs(60 * 60),
        }
    }
}

// =============================================================================
// Toast Types
// =============================================================================

/// Identifier of a published toast. Strictly increasing per center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// A toast to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    /// Overrides keyword classification when set.
    pub category: Option<ToastCategory>,
    /// Overrides the default auto-remove delay. Zero means sticky.
    pub duration: Option<Duration>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Toast {
            kind,
            message: message.into(),
            category: None,
            duration: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn with_category(mut self, category: ToastCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastRecord {
    pub id: ToastId,
    pub category: Option<ToastCategory>,
    pub kind: ToastKind,
    pub message: String,
    #[serde(skip)]
    pub created_at: Instant,
    /// 0 = sticky.
    pub duration_ms: u64,
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Default)]
struct ToastLedger {
    /// Last publish time per exact (kind, message).
    recent: HashMap<(ToastKind, String), Instant>,

    /// Last publish time per category.
    categories: HashMap<ToastCategory, Instant>,

    /// On-screen toasts, oldest first.
    visible: Vec<ToastRecord>,

    next_id: u64,
}

impl ToastLedger {
    fn prune(&mut self, now: Instant, retention: Duration) {
        self.recent
            .retain(|_, shown| now.duration_since(*shown) < retention);
        self.categories
            .retain(|_, shown| now.duration_since(*shown) < retention);
    }
}

// =============================================================================
// Notification Center
// =============================================================================

/// Deduplicating, rate-limiting toast queue.
///
/// Cheap to clone; clones share the same ledger and visible list.
///
/// ## Example
/// ```rust,ignore
/// let center = NotificationCenter::with_defaults();
///
/// assert!(center.publish(Toast::success("Saved")).await.is_some());
/// // Same (kind, message) within 2s is dropped.
/// assert!(center.publish(Toast::success("Saved")).await.is_none());
/// ```
#[derive(Clone)]
pub struct NotificationCenter {
    settings: Arc<NotificationSettings>,
    ledger: Arc<Mutex<ToastLedger>>,
    emitter: Arc<dyn UiEventEmitter>,
}

impl NotificationCenter {
    /// Creates a notification center.
    pub fn new(settings: NotificationSettings, emitter: Arc<dyn UiEventEmitter>) -> Self {
        NotificationCenter {
            settings: Arc::new(settings),
            ledger: Arc::new(Mutex::new(ToastLedger::default())),
            emitter,
        }
    }

    /// Creates a center with default settings and no emitter.
    pub fn with_defaults() -> Self {
        Self::new(NotificationSettings::default(), Arc::new(NoOpEmitter))
    }

    /// Returns the active settings.
    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Publishes a toast unless it is a duplicate or its category is cooling down.
    ///
    /// ## Returns
    /// * `Some(id)` - the toast is visible
    /// * `None` - suppressed
    pub async fn publish(&self, toast: Toast) -> Option<ToastId> {
        let now = Instant::now();
        let mut ledger = self.ledger.lock().await;

        let key = (toast.kind, toast.message.clone());
        if let Some(shown) = ledger.recent.get(&key) {
            if now.duration_since(*shown) < self.settings.dedup_window {
                debug!(kind = %toast.kind, message = %toast.message, "Duplicate toast suppressed");
                return None;
            }
        }

        let category = toast
            .category
            .or_else(|| ToastCategory::classify(&toast.message));

        if let Some(category) = category {
            if let Some(shown) = ledger.categories.get(&category) {
                if now.duration_since(*shown) < category.cooldown() {
                    debug!(
                        ?category,
                        message = %toast.message,
                        "Toast suppressed by category cooldown"
                    );
                    return None;
                }
            }
            ledger.categories.insert(category, now);
        }

        ledger.recent.insert(key, now);
        ledger.prune(now, self.settings.ledger_retention);

        ledger.next_id += 1;
        let id = ToastId(ledger.next_id);
        let duration = toast.duration.unwrap_or(self.settings.default_duration);

        let threshold = self.settings.cleanup_threshold;
        ledger
            .visible
            .retain(|t| now.duration_since(t.created_at) < threshold);

        ledger.visible.push(ToastRecord {
            id,
            category,
            kind: toast.kind,
            message: toast.message,
            created_at: now,
            duration_ms: duration.as_millis() as u64,
        });

        let max = self.settings.max_visible.min(MAX_VISIBLE_TOASTS);
        if ledger.visible.len() > max {
            let overflow = ledger.visible.len() - max;
            ledger.visible.drain(..overflow);
        }

        debug!(%id, kind = %toast.kind, visible = ledger.visible.len(), "Toast published");
        self.emitter.emit_toasts(&ledger.visible);
        drop(ledger);

        if !duration.is_zero() {
            self.schedule_removal(id, duration);
        }

        Some(id)
    }

    /// Removes a toast. Returns false if it was already gone.
    pub async fn remove(&self, id: ToastId) -> bool {
        let mut ledger = self.ledger.lock().await;
        let before = ledger.visible.len();
        ledger.visible.retain(|t| t.id != id);

        let removed = ledger.visible.len() != before;
        if removed {
            self.emitter.emit_toasts(&ledger.visible);
        }
        removed
    }

    /// Snapshot of the visible toasts, oldest first.
    pub async fn visible(&self) -> Vec<ToastRecord> {
        self.ledger.lock().await.visible.clone()
    }

    /// Dismisses every visible toast. The ledgers are kept.
    pub async fn clear(&self) {
        let mut ledger = self.ledger.lock().await;
        if !ledger.visible.is_empty() {
            ledger.visible.clear();
            self.emitter.emit_toasts(&ledger.visible);
        }
    }

    fn schedule_removal(&self, id: ToastId, after: Duration) {
        let center = self.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(after).await;
                    center.remove(id).await;
                });
            }
            Err(_) => warn!(%id, "No async runtime; toast will not auto-dismiss"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
