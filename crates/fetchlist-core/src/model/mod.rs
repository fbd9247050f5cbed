// ── Domain model ──
//
// Canonical types consumers depend on. Wire types from `fetchlist-api`
// are converted into these at the source boundary (see `convert`).

pub mod item;
pub mod status;

pub use item::{Item, ItemId, ListId};
pub use status::{GENERIC_ERROR_MESSAGE, LoadStatus};
