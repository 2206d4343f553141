//! # Analytics
//!
//! Dashboard statistics over tracked applications.
//!
//! The live analytics source may be slow or unavailable; [`Analytics::compute`]
//! is the pure, always-succeeding local fallback used when it is.
//!
//! ## Rates
//! ```text
//! response_rate  = applications with any employer response / total
//! interview_rate = applications that reached interviewing or offer / total
//! offer_rate     = applications with an offer / total
//! ```
//! All rates are 0.0 for an empty data set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::{ApplicationRecord, ApplicationStatus};

/// Where an [`Analytics`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsSource {
    /// Computed by the remote analytics service.
    Live,
    /// Computed on-device from local records.
    Local,
}

/// Aggregate statistics for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total: u32,
    pub by_status: BTreeMap<ApplicationStatus, u32>,
    pub response_rate: f64,
    pub interview_rate: f64,
    pub offer_rate: f64,
    #[ts(as = "String")]
    pub computed_at: DateTime<Utc>,
    pub source: AnalyticsSource,
}

impl Analytics {
    /// Computes analytics from local records.
    ///
    /// ```rust
    /// use tracker_core::{Analytics, AnalyticsSource};
    ///
    /// let empty = Analytics::compute(&[]);
    /// assert_eq!(empty.total, 0);
    /// assert_eq!(empty.response_rate, 0.0);
    /// assert_eq!(empty.source, AnalyticsSource::Local);
    /// ```
    pub fn compute(records: &[ApplicationRecord]) -> Self {
        let mut by_status: BTreeMap<ApplicationStatus, u32> =
            ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();

        let mut responded = 0u32;
        let mut interviewed = 0u32;
        let mut offers = 0u32;

        for record in records {
            *by_status.entry(record.status).or_insert(0) += 1;
            if record.status.has_response() {
                responded += 1;
            }
            if record.status.reached_interview() {
                interviewed += 1;
            }
            if record.status == ApplicationStatus::Offer {
                offers += 1;
            }
        }

        let total = records.len() as u32;

        Analytics {
            total,
            by_status,
            response_rate: ratio(responded, total),
            interview_rate: ratio(interviewed, total),
            offer_rate: ratio(offers, total),
            computed_at: Utc::now(),
            source: AnalyticsSource::Local,
        }
    }

    /// Number of applications currently in `status`.
    pub fn count(&self, status: ApplicationStatus) -> u32 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Returns true if these numbers came from the local fallback.
    pub fn is_degraded(&self) -> bool {
        self.source == AnalyticsSource::Local
    }
}

fn ratio(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
