use serde::{Deserialize, Serialize};

/// Item identifier, unique within one fetch.
pub type ItemId = i64;

/// The list an item belongs to; the default grouping key.
pub type ListId = i64;

/// One item from the remote collection. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub name: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, list_id: ListId, name: Option<String>) -> Self {
        Self { id, list_id, name }
    }

    /// The name to show, or `None` if it is absent, empty, or whitespace-only.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}
