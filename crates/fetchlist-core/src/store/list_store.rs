// ── List state store ──
//
// Owns the published `ListSnapshot`. Every transition is one
// `send_replace` on a `watch` channel, so readers never see a
// half-applied update. The same snapshots are also pushed through a
// `broadcast` channel for consumers that need every transition in order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::ListSnapshot;
use crate::model::{Item, ItemId, LoadStatus};
use crate::pipeline::GroupedItems;
use crate::stream::StateStream;

const TRANSITION_CHANNEL_SIZE: usize = 64;

/// Reactive store for the item list's observable state.
pub struct ListStore {
    state: watch::Sender<Arc<ListSnapshot>>,
    transitions: broadcast::Sender<Arc<ListSnapshot>>,
}

impl ListStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(ListSnapshot::initial()));
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_SIZE);
        Self { state, transitions }
    }

    // ── Transitions (controller only) ────────────────────────────────

    /// Enter `Loading` for a new cycle, dropping whatever was shown before.
    pub(crate) fn begin_cycle(&self, generation: u64) {
        let last_refreshed = self.state.borrow().last_refreshed;
        self.publish(ListSnapshot {
            status: LoadStatus::Loading,
            refreshing: true,
            groups: Arc::new(GroupedItems::new()),
            generation,
            last_refreshed,
        });
    }

    /// Publish the terminal state of a cycle together with its groups.
    pub(crate) fn settle(&self, generation: u64, status: LoadStatus, groups: Arc<GroupedItems>) {
        let groups = if status == LoadStatus::Success {
            groups
        } else {
            Arc::new(GroupedItems::new())
        };
        self.publish(ListSnapshot {
            status,
            refreshing: false,
            groups,
            generation,
            last_refreshed: Some(Utc::now()),
        });
    }

    fn publish(&self, snapshot: ListSnapshot) {
        debug!(
            generation = snapshot.generation,
            status = snapshot.status.as_ref(),
            refreshing = snapshot.refreshing,
            "publishing list state"
        );
        let snapshot = Arc::new(snapshot);
        // `send_replace` updates unconditionally, even with zero receivers.
        self.state.send_replace(Arc::clone(&snapshot));
        let _ = self.transitions.send(snapshot);
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        Arc::clone(&self.state.borrow())
    }

    pub fn status(&self) -> LoadStatus {
        self.state.borrow().status.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.borrow().refreshing
    }

    pub fn grouped_items(&self) -> Arc<GroupedItems> {
        Arc::clone(&self.state.borrow().groups)
    }

    pub fn item(&self, id: ItemId) -> Option<Arc<Item>> {
        self.state.borrow().item(id)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Latest-value subscription; intermediate states may be skipped.
    ///
    /// Until the first cycle starts, the current snapshot is the
    /// generation-0 `Loading` state with `refreshing = false`.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    /// Every published transition, in order. Slow receivers see
    /// `RecvError::Lagged` rather than a reordered history.
    pub fn transitions(&self) -> broadcast::Receiver<Arc<ListSnapshot>> {
        self.transitions.subscribe()
    }
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}
