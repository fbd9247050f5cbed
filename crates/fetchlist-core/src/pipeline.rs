// ── Filter → sort → group ──
//
// Pure transform from one fetched collection to the grouped view the
// presentation layer renders. Re-run wholesale on every refresh.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::model::Item;

/// Key items are partitioned by.
pub type GroupKey = i64;

/// Groups in first-occurrence order, each holding items in display order.
pub type GroupedItems = IndexMap<GroupKey, Vec<Arc<Item>>>;

/// Key shared by every item under [`Grouping::Flat`].
pub const FLAT_GROUP_KEY: GroupKey = 0;

/// How sorted items are partitioned into groups.
#[derive(Clone, Default)]
pub enum Grouping {
    /// One group per `list_id`.
    #[default]
    ListId,
    /// A single group holding every item, in sorted order.
    Flat,
    Custom(Arc<dyn Fn(&Item) -> GroupKey + Send + Sync>),
}

impl Grouping {
    pub fn by_list_id() -> Self {
        Self::ListId
    }

    /// No grouping: every item lands under [`FLAT_GROUP_KEY`].
    pub fn flat() -> Self {
        Self::Flat
    }

    pub fn custom(key: impl Fn(&Item) -> GroupKey + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(key))
    }

    pub fn key(&self, item: &Item) -> GroupKey {
        match self {
            Self::ListId => item.list_id,
            Self::Flat => FLAT_GROUP_KEY,
            Self::Custom(f) => f(item),
        }
    }
}

impl fmt::Debug for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListId => f.write_str("ListId"),
            Self::Flat => f.write_str("Flat"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// `true` if the item has a usable display name.
pub fn is_displayable(item: &Item) -> bool {
    item.display_name().is_some()
}

/// Run the full transform.
///
/// 1. drop items without a usable name,
/// 2. stable-sort by `(list_id, name)`,
/// 3. partition by `grouping`, groups ordered by first occurrence.
///
/// An empty result means there is nothing to show.
pub fn process(items: impl IntoIterator<Item = Item>, grouping: &Grouping) -> GroupedItems {
    let mut visible: Vec<Item> = items.into_iter().filter(is_displayable).collect();
    visible.sort_by(|a, b| a.list_id.cmp(&b.list_id).then_with(|| a.name.cmp(&b.name)));

    let mut groups = GroupedItems::new();
    for item in visible {
        groups
            .entry(grouping.key(&item))
            .or_default()
            .push(Arc::new(item));
    }
    groups
}

/// [`process`], with a panic anywhere inside the transform (typically a
/// custom key function) turned into [`CoreError::Pipeline`].
pub fn try_process(items: Vec<Item>, grouping: &Grouping) -> Result<GroupedItems, CoreError> {
    panic::catch_unwind(AssertUnwindSafe(|| process(items, grouping))).map_err(|payload| {
        CoreError::Pipeline {
            message: panic_message(&*payload),
        }
    })
}

/// All items across all groups, in group-iteration order.
pub fn flatten(groups: &GroupedItems) -> Vec<Arc<Item>> {
    groups.values().flatten().cloned().collect()
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "transform panicked".to_owned()
    }
}
