//! Cache envelope for remotely fetched resources.
//!
//! Every dashboard value is published inside a `CachedResource` so readers
//! can always distinguish "never asked", "first load", "background refresh
//! with stale data on screen", "current", and "failed but still showing the
//! last good value".

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Lifecycle status of a cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Never requested.
    Idle,
    /// First fetch, nothing to show yet.
    Loading,
    /// Fetch with previous data still on display.
    Refreshing,
    /// Data is current.
    Ready,
    /// Last fetch failed; `data` may still hold the previous value.
    Error,
}

impl ResourceStatus {
    /// True while a fetch for this resource is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ResourceStatus::Loading | ResourceStatus::Refreshing)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Idle => write!(f, "idle"),
            ResourceStatus::Loading => write!(f, "loading"),
            ResourceStatus::Refreshing => write!(f, "refreshing"),
            ResourceStatus::Ready => write!(f, "ready"),
            ResourceStatus::Error => write!(f, "error"),
        }
    }
}

/// One remotely fetched value plus its lifecycle metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResource<T> {
    pub data: Option<T>,
    pub status: ResourceStatus,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for CachedResource<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: ResourceStatus::Idle,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> CachedResource<T> {
    /// Marks the start of a fetch. `Loading` only when there is nothing to
    /// show yet; with data already present this is a background refresh.
    pub fn begin(&mut self) {
        self.status = if self.data.is_some() {
            ResourceStatus::Refreshing
        } else {
            ResourceStatus::Loading
        };
    }

    /// Installs fresh data and clears any previous error.
    pub fn complete(&mut self, data: T) {
        self.data = Some(data);
        self.status = ResourceStatus::Ready;
        self.error = None;
        self.updated_at = Some(Utc::now());
    }

    /// Records a failure. Existing data stays in place so the caller can
    /// keep showing the stale value next to the error.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ResourceStatus::Error;
        self.error = Some(message.into());
    }

    /// True while the value is `Ready` and younger than `ttl`. A zero TTL
    /// disables reuse entirely.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        if self.status != ResourceStatus::Ready || ttl.is_zero() {
            return false;
        }
        match self.updated_at {
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age < chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
            }
            None => false,
        }
    }
}
