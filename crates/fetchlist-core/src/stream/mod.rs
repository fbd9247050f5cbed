// ── Reactive state streams ──
//
// Subscription types for consuming list state changes from the `ListStore`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::ListSnapshot;

/// A subscription to the list state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct StateStream {
    current: Arc<ListSnapshot>,
    receiver: watch::Receiver<Arc<ListSnapshot>>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<ListSnapshot>>) -> Self {
        let current = Arc::clone(&receiver.borrow());
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<ListSnapshot> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<ListSnapshot> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the sender (the store) has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<ListSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = Arc::clone(&self.receiver.borrow_and_update());
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Wait until no cycle is in flight and at least one has completed.
    pub async fn settled(&mut self) -> Option<Arc<ListSnapshot>> {
        let snap = {
            let guard = self.receiver.wait_for(|snap| snap.is_settled()).await.ok()?;
            Arc::clone(&guard)
        };
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then a new one each time the
/// store publishes.
pub struct StateWatchStream {
    inner: WatchStream<Arc<ListSnapshot>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<ListSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
