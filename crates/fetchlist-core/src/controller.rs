// ── Item list controller ──
//
// Orchestrates refresh cycles: fetch through the injected `ItemSource`,
// run the filter/sort/group pipeline, and publish the outcome to the
// `ListStore`. Every failure is recovered here; consumers only ever see
// `LoadStatus::Error` with the generic message.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fetchlist_api::ItemsClient;
use fetchlist_api::transport::{TlsMode, TransportConfig};

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Item, ItemId, LoadStatus};
use crate::pipeline::{self, GroupedItems};
use crate::source::ItemSource;
use crate::store::{ListSnapshot, ListStore};
use crate::stream::StateStream;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the list state
/// exclusively; the presentation layer reads snapshots and calls
/// [`refresh()`](Self::refresh), nothing else.
pub struct ItemListController<S: ItemSource> {
    inner: Arc<ControllerInner<S>>,
}

impl<S: ItemSource> Clone for ItemListController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<S> {
    config: ControllerConfig,
    source: S,
    store: ListStore,
    cycle: Mutex<CycleState>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Bookkeeping for the newest refresh cycle.
#[derive(Default)]
struct CycleState {
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl ItemListController<ItemsClient> {
    /// Build a controller backed by an HTTP [`ItemsClient`] for
    /// `config.endpoint`. Does NOT fetch; call [`start()`](Self::start)
    /// or [`refresh()`](Self::refresh).
    pub fn from_config(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ItemsClient::new(config.endpoint.clone(), &transport)?;
        Ok(Self::new(client, config))
    }
}

impl<S: ItemSource> ItemListController<S> {
    /// Create a controller around an injected source. Does NOT fetch.
    pub fn new(source: S, config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                source,
                store: ListStore::new(),
                cycle: Mutex::new(CycleState::default()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &ListStore {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the initial refresh, then spawn the periodic refresh task if
    /// `refresh_interval_secs` is non-zero. Later calls only refresh.
    pub async fn start(&self) -> Arc<ListSnapshot> {
        let snapshot = self.refresh().await;

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let mut handles = self.inner.task_handles.lock().await;
            if handles.is_empty() {
                let ctrl = self.clone();
                let cancel = self.inner.cancel.clone();
                handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
            } else {
                debug!("periodic refresh already running");
            }
        }

        info!(
            status = snapshot.status.as_ref(),
            items = snapshot.item_count(),
            interval_secs,
            "item list controller started"
        );
        snapshot
    }

    /// Cancel background tasks and any in-flight fetch, then wait for
    /// spawned tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("item list controller shut down");
    }

    // ── Refresh cycles ───────────────────────────────────────────

    /// Run one refresh cycle to completion and return the latest snapshot.
    ///
    /// The cycle publishes `Loading` (with `refreshing = true`) before the
    /// fetch is issued, and a terminal status together with the groups
    /// (with `refreshing = false`) once it settles. Starting a cycle
    /// cancels the previous in-flight fetch; a superseded cycle never
    /// publishes, so the most recently started cycle always wins.
    ///
    /// The fetch runs on its own task: dropping this future does not
    /// abandon the cycle, which still settles in the background.
    pub async fn refresh(&self) -> Arc<ListSnapshot> {
        let (generation, token) = self.begin_cycle().await;

        let ctrl = self.clone();
        let cycle = tokio::spawn(async move { ctrl.run_cycle(generation, token).await });
        if let Err(e) = cycle.await {
            warn!(generation, error = %e, "refresh task did not complete");
        }

        self.inner.store.snapshot()
    }

    /// Start a refresh in the background (pull-to-refresh).
    pub fn spawn_refresh(&self) -> JoinHandle<Arc<ListSnapshot>> {
        let ctrl = self.clone();
        tokio::spawn(async move { ctrl.refresh().await })
    }

    async fn run_cycle(&self, generation: u64, token: CancellationToken) {
        let fetch = AssertUnwindSafe(self.inner.source.fetch_all()).catch_unwind();

        let fetched = tokio::select! {
            biased;
            () = token.cancelled() => None,
            result = fetch => Some(result.unwrap_or_else(|payload| {
                Err(CoreError::Internal(format!(
                    "item source panicked: {}",
                    pipeline::panic_message(&*payload)
                )))
            })),
        };

        match fetched {
            Some(result) => {
                let (status, groups) = self.process(generation, result);
                self.finish_cycle(generation, status, groups).await;
            }
            None => self.abandon_cycle(generation).await,
        }
    }

    async fn begin_cycle(&self) -> (u64, CancellationToken) {
        let mut cycle = self.inner.cycle.lock().await;
        cycle.generation += 1;
        let token = self.inner.cancel.child_token();
        if let Some(previous) = cycle.in_flight.replace(token.clone()) {
            debug!(generation = cycle.generation, "superseding in-flight refresh");
            previous.cancel();
        }
        self.inner.store.begin_cycle(cycle.generation);
        (cycle.generation, token)
    }

    /// Turn a fetch result into the status and groups to publish.
    fn process(
        &self,
        generation: u64,
        fetched: Result<Vec<Item>, CoreError>,
    ) -> (LoadStatus, Arc<GroupedItems>) {
        let processed = fetched
            .and_then(|items| pipeline::try_process(items, &self.inner.config.grouping));

        match processed {
            Ok(groups) if groups.is_empty() => (LoadStatus::Empty, Arc::new(groups)),
            Ok(groups) => (LoadStatus::Success, Arc::new(groups)),
            Err(e) => {
                warn!(generation, kind = e.kind(), error = %e, "item list refresh failed");
                (LoadStatus::failed(), Arc::new(GroupedItems::new()))
            }
        }
    }

    async fn finish_cycle(&self, generation: u64, status: LoadStatus, groups: Arc<GroupedItems>) {
        let mut cycle = self.inner.cycle.lock().await;
        if cycle.generation != generation {
            debug!(generation, newest = cycle.generation, "discarding superseded refresh result");
            return;
        }
        cycle.in_flight = None;

        let groups_len = groups.len();
        let status_label = status.as_ref().to_owned();
        self.inner.store.settle(generation, status, groups);
        info!(generation, status = %status_label, groups = groups_len, "item list refreshed");
    }

    /// The fetch was cancelled. If no newer cycle took over (shutdown),
    /// settle as an error so `Loading` never outlives its cycle.
    async fn abandon_cycle(&self, generation: u64) {
        let mut cycle = self.inner.cycle.lock().await;
        if cycle.generation != generation {
            debug!(generation, "refresh superseded before fetch settled");
            return;
        }
        cycle.in_flight = None;
        warn!(generation, "refresh cancelled during shutdown");
        self.inner
            .store
            .settle(generation, LoadStatus::failed(), Arc::new(GroupedItems::new()));
    }

    // ── State observation ────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        self.inner.store.snapshot()
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.store.status()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.store.is_refreshing()
    }

    pub fn grouped_items(&self) -> Arc<GroupedItems> {
        self.inner.store.grouped_items()
    }

    /// Detail lookup: the displayed item with this id, if any.
    pub fn item(&self, id: ItemId) -> Option<Arc<Item>> {
        self.inner.store.item(id)
    }

    /// Subscribe to the latest list state. A generation-0 `Loading`
    /// snapshot means no refresh has started yet.
    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    /// Subscribe to every state transition, in order.
    pub fn transitions(&self) -> broadcast::Receiver<Arc<ListSnapshot>> {
        self.inner.store.transitions()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh the item list.
async fn refresh_task<S: ItemSource>(
    controller: ItemListController<S>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let snapshot = controller.refresh().await;
                debug!(status = snapshot.status.as_ref(), "periodic refresh complete");
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig::default()
        .with_timeout(config.timeout)
        .with_tls(tls_to_transport(&config.tls))
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
