// ── Reactive list state ──
//
// Single-owner snapshot storage with push-based change notification.

mod list_store;
mod snapshot;

pub use list_store::ListStore;
pub use snapshot::ListSnapshot;
