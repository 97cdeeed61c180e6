//! Business logic for the dashboard data cache.
//!
//! Owns the `DashboardState` snapshot and publishes it through a watch
//! channel. Fetches are cached with a freshness window, deduplicated per
//! site, and never leave an entry stuck in a loading status: every fetch
//! settles its entry as `Ready` or `Error` on all paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::BackendApi;
use crate::auth::models::AuthState;
use crate::dashboard::models::{DashboardSummary, Site, SiteId, SiteReport};
use crate::dashboard::resource::{CachedResource, ResourceStatus};

/// How long a `Ready` value is reused before a non-forced request fetches
/// again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Snapshot of everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub summary: CachedResource<DashboardSummary>,
    pub sites: CachedResource<Vec<Site>>,
    pub reports: HashMap<SiteId, CachedResource<SiteReport>>,
}

impl DashboardState {
    /// Report entry for one site; an `Idle` default when never requested.
    pub fn report(&self, site_id: SiteId) -> CachedResource<SiteReport> {
        self.reports.get(&site_id).cloned().unwrap_or_default()
    }
}

/// Service for cached, deduplicated dashboard data.
pub struct DashboardService {
    api: Arc<dyn BackendApi>,
    state: watch::Sender<DashboardState>,
    /// Site ids with a report fetch outstanding. Guarded by a scoped drop
    /// guard so a slot is released on every exit path.
    in_flight: Mutex<HashSet<SiteId>>,
    ttl: Duration,
}

impl DashboardService {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self::with_ttl(api, DEFAULT_TTL)
    }

    pub fn with_ttl(api: Arc<dyn BackendApi>, ttl: Duration) -> Self {
        Self {
            api,
            state: watch::Sender::new(DashboardState::default()),
            in_flight: Mutex::new(HashSet::new()),
            ttl,
        }
    }

    /// Returns a receiver that observes every published `DashboardState`.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Refreshes the company summary and the site list together.
    ///
    /// The two requests run concurrently and settle as a pair: both entries
    /// become `Ready` on success, both `Error` when either request fails.
    /// Without `force`, a pair still inside the freshness window is reused
    /// and no request goes out.
    pub async fn refresh_dashboard(&self, force: bool) {
        if !force {
            let state = self.state.borrow();
            if state.summary.is_fresh(self.ttl) && state.sites.is_fresh(self.ttl) {
                debug!("dashboard data is fresh, skipping refresh");
                return;
            }
        }

        self.state.send_modify(|state| {
            state.summary.begin();
            state.sites.begin();
        });

        let (summary, sites) =
            futures::future::join(self.api.dashboard_summary(), self.api.list_sites()).await;

        match (summary, sites) {
            (Ok(summary), Ok(sites)) => {
                info!("dashboard refreshed: {} sites", sites.len());
                self.state.send_modify(|state| {
                    state.summary.complete(summary);
                    state.sites.complete(sites);
                });
            }
            (summary, sites) => {
                let message = [summary.err(), sites.err()]
                    .into_iter()
                    .flatten()
                    .map(|e| e.message())
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!("dashboard refresh failed: {}", message);
                self.state.send_modify(|state| {
                    state.summary.fail(message.clone());
                    state.sites.fail(message);
                });
            }
        }
    }

    /// Fetches the analytics report for one site, identified by its route
    /// string.
    ///
    /// Invalid ids are refused without touching any state. A request for a
    /// site whose fetch is already outstanding issues no second request
    /// and instead waits for that fetch to settle.
    pub async fn site_report(&self, raw_id: &str, force: bool) {
        let site_id = match raw_id.parse::<SiteId>() {
            Ok(site_id) => site_id,
            Err(e) => {
                error!("refusing site report request: {}", e);
                return;
            }
        };

        if !force && self.state.borrow().report(site_id).is_fresh(self.ttl) {
            debug!("site {} report is fresh, skipping fetch", site_id);
            return;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, site_id) else {
            debug!("site {} report already loading, attaching", site_id);
            self.wait_for_settled(site_id).await;
            return;
        };

        self.state.send_modify(|state| {
            state.reports.entry(site_id).or_default().begin();
        });

        match self.api.site_report(site_id).await {
            Ok(report) => {
                info!("site {} report loaded", site_id);
                self.state.send_modify(|state| {
                    state.reports.entry(site_id).or_default().complete(report);
                });
            }
            Err(e) => {
                warn!("site {} report failed: {}", site_id, e);
                let message = e.message();
                self.state.send_modify(|state| {
                    state.reports.entry(site_id).or_default().fail(message);
                });
            }
        }
    }

    /// Parks until the report entry for `site_id` leaves its in-flight
    /// status.
    async fn wait_for_settled(&self, site_id: SiteId) {
        let mut rx = self.state.subscribe();
        loop {
            if !rx.borrow_and_update().report(site_id).status.is_in_flight() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Starts the background task that loads the dashboard for owners.
    ///
    /// The first time the auth state shows an owner session while the
    /// dashboard was never loaded, one non-forced refresh is issued.
    /// Workers and anonymous sessions never trigger it. The task ends when
    /// the auth channel closes.
    pub fn spawn_autoload(
        self: Arc<Self>,
        mut auth: watch::Receiver<AuthState>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let should_load = {
                    let auth_state = auth.borrow_and_update();
                    auth_state
                        .session
                        .as_ref()
                        .is_some_and(|session| session.role.is_owner())
                        && self.state.borrow().summary.status == ResourceStatus::Idle
                };
                if should_load {
                    info!("owner session detected, loading dashboard");
                    self.refresh_dashboard(false).await;
                }
                if auth.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

/// Scoped in-flight marker for one site report fetch. Dropping it releases
/// the slot, whatever path the fetch takes out.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<SiteId>>,
    site_id: SiteId,
}

impl<'a> InFlightGuard<'a> {
    /// Claims the slot for `site_id`; `None` when a fetch already holds it.
    fn acquire(set: &'a Mutex<HashSet<SiteId>>, site_id: SiteId) -> Option<Self> {
        let mut ids = set.lock().expect("in-flight set lock poisoned");
        ids.insert(site_id).then(|| Self { set, site_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight set lock poisoned")
            .remove(&self.site_id);
    }
}
