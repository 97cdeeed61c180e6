//! Data models for the company dashboard and per-site analytics.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a construction site. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SiteId(i64);

impl SiteId {
    /// Accepts only strictly positive raw ids.
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for SiteId {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("invalid site id '{}'", raw))
    }
}

impl From<SiteId> for i64 {
    fn from(id: SiteId) -> i64 {
        id.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = String;

    /// Parses ids arriving as route or query strings. Rejects everything
    /// that is not a strictly positive integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("invalid site id '{}'", s))
    }
}

/// Lifecycle state of a construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Active,
    Suspended,
    Completed,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Active => write!(f, "active"),
            SiteStatus::Suspended => write!(f, "suspended"),
            SiteStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A construction site as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    pub status: SiteStatus,
    #[serde(default)]
    pub progress_percent: Option<f64>,
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
}

/// Company-wide roll-up shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_sites: u32,
    pub workers_on_site: u32,
    pub hours_this_month: f64,
    pub materials_cost_month: f64,
    pub pending_quotes: u32,
    pub quotes_value: f64,
    /// Total of progress billings (SAL) not yet invoiced.
    pub open_sal_amount: f64,
}

/// Hours one worker logged on a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerHours {
    pub user_id: String,
    pub name: String,
    pub hours: f64,
}

/// Analytics report for a single site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    pub site_id: SiteId,
    pub hours_total: f64,
    #[serde(default)]
    pub hours_by_worker: Vec<WorkerHours>,
    pub materials_cost: f64,
    pub materials_entries: u32,
    pub attendance_days: u32,
    pub quoted_amount: f64,
    pub billed_amount: f64,
}
