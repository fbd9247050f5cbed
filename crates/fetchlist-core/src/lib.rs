//! Reactive item list between `fetchlist-api` and a presentation layer.
//!
//! This crate owns the business logic of the item list:
//!
//! - **[`ItemListController`]**: Runs refresh cycles: fetches the full
//!   collection through an injected [`ItemSource`], applies the
//!   [`pipeline`], and publishes the outcome. All failures are recovered
//!   here and surface only as [`LoadStatus::Error`] with a generic message.
//!
//! - **[`pipeline`]**: Pure filter → sort → group transform. Items without
//!   a usable name are dropped, the rest are ordered by `(list_id, name)`
//!   and partitioned by a pluggable [`Grouping`] key.
//!
//! - **[`ListStore`]**: Holds the published [`ListSnapshot`] in a
//!   `tokio::sync::watch` channel. Status, groups, and the `refreshing`
//!   flag are replaced together, never one at a time.
//!
//! - **[`StateStream`]**: Subscription handle vended by the store.
//!   Exposes `current()` / `latest()` / `changed()` / `settled()` for
//!   reactive rendering.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use controller::ItemListController;
pub use error::CoreError;
pub use model::{GENERIC_ERROR_MESSAGE, Item, ItemId, ListId, LoadStatus};
pub use pipeline::{GroupKey, GroupedItems, Grouping};
pub use source::ItemSource;
pub use store::{ListSnapshot, ListStore};
pub use stream::StateStream;
