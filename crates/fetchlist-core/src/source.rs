// ── Item source seam ──
//
// The controller is generic over where items come from. Production
// code plugs in `ItemsClient`; tests plug in scripted sources.

use std::future::Future;
use std::sync::Arc;

use fetchlist_api::ItemsClient;
use tracing::debug;

use crate::error::CoreError;
use crate::model::Item;

/// A read-only provider of the full item collection.
///
/// One call is one fetch: implementations must not retry or cache.
/// Sources are shared across concurrent refresh cycles, so they must
/// be safe to call concurrently.
pub trait ItemSource: Send + Sync + 'static {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Item>, CoreError>> + Send;
}

impl ItemSource for ItemsClient {
    async fn fetch_all(&self) -> Result<Vec<Item>, CoreError> {
        let raw = ItemsClient::fetch_all(self).await?;
        debug!(count = raw.len(), endpoint = %self.endpoint(), "converted item collection");
        Ok(raw.into_iter().map(Item::from).collect())
    }
}

impl<T: ItemSource> ItemSource for Arc<T> {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Item>, CoreError>> + Send {
        T::fetch_all(self)
    }
}
