use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Item, ItemId, LoadStatus};
use crate::pipeline::{self, GroupedItems};

/// Everything the presentation layer reads, captured at one instant.
///
/// Snapshots are immutable and replaced wholesale, so `status`,
/// `refreshing`, and `groups` always agree with each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub status: LoadStatus,
    /// `true` exactly while a fetch is in flight.
    pub refreshing: bool,
    /// Non-empty only when `status` is `Success`.
    pub groups: Arc<GroupedItems>,
    /// Cycle that produced this snapshot; 0 before the first refresh.
    pub generation: u64,
    /// When the most recent cycle settled.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl ListSnapshot {
    /// State before any cycle has started: `Loading` with
    /// `refreshing = false` and generation 0. This pair only ever means
    /// "not started yet"; once a cycle begins, `Loading` always comes
    /// with `refreshing = true`.
    pub(crate) fn initial() -> Self {
        Self {
            status: LoadStatus::Loading,
            refreshing: false,
            groups: Arc::new(GroupedItems::new()),
            generation: 0,
            last_refreshed: None,
        }
    }

    /// `true` once at least one cycle has run to completion and no
    /// other is in flight.
    pub fn is_settled(&self) -> bool {
        !self.refreshing && self.generation > 0
    }

    /// Look up a displayed item by id (the detail route's parameter).
    pub fn item(&self, id: ItemId) -> Option<Arc<Item>> {
        self.groups
            .values()
            .flatten()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Total number of displayed items across all groups.
    pub fn item_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// All displayed items in group-iteration order.
    pub fn items(&self) -> Vec<Arc<Item>> {
        pipeline::flatten(&self.groups)
    }
}
