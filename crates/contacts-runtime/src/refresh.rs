//! Refresh Coordinator
//!
//! Serializes contact reloads: at most one load runs at a time and requests
//! that arrive while one is running are coalesced into it. A finished load is
//! dispatched to the registered views selected by the request's tab mask, the
//! active search query is reapplied to the current view, and a
//! [`RefreshEvent`] is published to subscribers.

use contacts_core::{DataAccess, SharedContacts, TabKind, TabMask, ViewState};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Refresh coordinator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Capacity of the refresh event channel
    pub event_buffer_size: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 16,
        }
    }
}

// ----------------------------------------------------------------------------
// Request / Outcome
// ----------------------------------------------------------------------------

/// Tabs to reload and which of them receive the list as structurally new
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub mask: TabMask,
    skip_change_detection: TabMask,
}

impl RefreshRequest {
    /// Display-name tabs always skip change detection; the groups tab only
    /// when it is reloaded on its own.
    pub fn new(mask: TabMask) -> Self {
        let mut skip = TabMask::from_bits_truncate(
            mask.bits() & (TabMask::CONTACTS | TabMask::FAVORITES).bits(),
        );
        if mask == TabMask::GROUPS {
            skip |= TabMask::GROUPS;
        }
        Self {
            mask,
            skip_change_detection: skip,
        }
    }

    /// Override the per-tab skip flags
    pub fn with_skip_change_detection(mut self, tabs: TabMask) -> Self {
        self.skip_change_detection = tabs;
        self
    }

    pub fn skips_change_detection(&self, tab: TabKind) -> bool {
        self.skip_change_detection.contains(tab)
    }
}

impl From<TabMask> for RefreshRequest {
    fn from(mask: TabMask) -> Self {
        RefreshRequest::new(mask)
    }
}

/// Why a refresh request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyMask,
    Closed,
}

/// What happened to one refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This request ran a load and dispatched it to `views` views
    Dispatched { generation: u64, views: usize },
    /// A load was already in flight; this request was absorbed by it
    Coalesced,
    /// The load failed; nothing was dispatched
    LoadFailed { generation: u64 },
    Skipped(SkipReason),
}

impl RefreshOutcome {
    /// Whether this request started a load of its own
    pub fn started_load(&self) -> bool {
        matches!(
            self,
            RefreshOutcome::Dispatched { .. } | RefreshOutcome::LoadFailed { .. }
        )
    }
}

/// Published after every dispatched load
#[derive(Debug, Clone)]
pub struct RefreshEvent {
    pub generation: u64,
    pub mask: TabMask,
    pub contacts: SharedContacts,
}

/// Counters describing coordinator activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub loads_started: u64,
    pub requests_coalesced: u64,
    pub loads_completed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    loads_started: AtomicU64,
    requests_coalesced: AtomicU64,
    loads_completed: AtomicU64,
}

// ----------------------------------------------------------------------------
// In-flight Guard
// ----------------------------------------------------------------------------

/// Holds the single in-flight slot; released on drop, including on unwind.
/// Owned by the load task, so a caller that stops waiting cannot release it.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ----------------------------------------------------------------------------
// Coordinator
// ----------------------------------------------------------------------------

/// State shared between the coordinator handle and its load tasks
struct Shared {
    data: Arc<dyn DataAccess>,
    views: Arc<RwLock<ViewState>>,
    in_flight: Arc<AtomicBool>,
    closed: AtomicBool,
    events: broadcast::Sender<RefreshEvent>,
    counters: Counters,
}

/// Single-flight loader and dispatcher for the browser views
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    pub fn new(
        data: Arc<dyn DataAccess>,
        views: Arc<RwLock<ViewState>>,
        config: RefreshConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer_size.max(1));
        Self {
            shared: Arc::new(Shared {
                data,
                views,
                in_flight: Arc::new(AtomicBool::new(false)),
                closed: AtomicBool::new(false),
                events,
                counters: Counters::default(),
            }),
        }
    }

    /// Reload the tabs in `mask` with the default skip flags
    pub async fn refresh(&self, mask: TabMask) -> RefreshOutcome {
        self.refresh_with(RefreshRequest::new(mask)).await
    }

    /// Run `request` unless a load is already in flight.
    ///
    /// Returns once the load has been dispatched; coalesced requests return
    /// immediately and their mask is not merged into the running load. The
    /// load and its dispatch run in their own task and complete even if the
    /// returned future is dropped.
    pub async fn refresh_with(&self, request: RefreshRequest) -> RefreshOutcome {
        let shared = &self.shared;
        if shared.closed.load(Ordering::Acquire) {
            debug!("Refresh requested after close, ignoring");
            return RefreshOutcome::Skipped(SkipReason::Closed);
        }
        if request.mask.is_empty() {
            debug!("Refresh requested for no tabs, ignoring");
            return RefreshOutcome::Skipped(SkipReason::EmptyMask);
        }

        let Some(guard) = InFlightGuard::try_acquire(&shared.in_flight) else {
            shared
                .counters
                .requests_coalesced
                .fetch_add(1, Ordering::Relaxed);
            debug!(
                "Load already in flight, coalescing request for {:?}",
                request.mask
            );
            return RefreshOutcome::Coalesced;
        };

        let generation = shared.counters.loads_started.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Starting contact load {} for {:?}", generation, request.mask);

        let task = {
            let shared = Arc::clone(shared);
            tokio::spawn(async move { shared.run_load(guard, request, generation).await })
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Contact load task {} panicked: {}", generation, e);
                RefreshOutcome::LoadFailed { generation }
            }
        }
    }

    /// Receive an event after each dispatched load
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> RefreshStats {
        let counters = &self.shared.counters;
        RefreshStats {
            loads_started: counters.loads_started.load(Ordering::Relaxed),
            requests_coalesced: counters.requests_coalesced.load(Ordering::Relaxed),
            loads_completed: counters.loads_completed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting requests; a load already running completes without
    /// dispatching
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            info!("Refresh coordinator closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl Shared {
    async fn run_load(
        &self,
        guard: InFlightGuard,
        request: RefreshRequest,
        generation: u64,
    ) -> RefreshOutcome {
        let loaded = self.data.load_contacts().await;

        // Release before dispatch so a refresh issued from a view callback
        // starts a fresh load
        drop(guard);
        self.counters.loads_completed.fetch_add(1, Ordering::Relaxed);

        let contacts = match loaded {
            Ok(contacts) => Arc::new(contacts),
            Err(e) => {
                warn!("Contact load {} failed: {}", generation, e);
                return RefreshOutcome::LoadFailed { generation };
            }
        };

        if self.closed.load(Ordering::Acquire) {
            debug!("Coordinator closed during load {}, dropping result", generation);
            return RefreshOutcome::Skipped(SkipReason::Closed);
        }

        let views = self.dispatch(&request, &contacts).await;
        info!(
            "Dispatched {} contacts to {} views (load {})",
            contacts.len(),
            views,
            generation
        );

        // No subscribers is fine
        let _ = self.events.send(RefreshEvent {
            generation,
            mask: request.mask,
            contacts,
        });

        RefreshOutcome::Dispatched { generation, views }
    }

    async fn dispatch(&self, request: &RefreshRequest, contacts: &SharedContacts) -> usize {
        let state = self.views.read().await;
        let targets = state.registry.views_in(request.mask);
        for (tab, view) in &targets {
            view.refresh_contacts(contacts, request.skips_change_detection(*tab));
        }

        if let Some(query) = state.search.active_query() {
            if let Some(view) = state.current_view() {
                debug!("Reapplying search query to {:?}", view.tab());
                view.on_search_query_changed(query);
            }
        }

        targets.len()
    }
}
