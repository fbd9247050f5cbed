// Shared helpers for the controller integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, oneshot};

use fetchlist_core::{CoreError, Item, ItemSource, ListSnapshot};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn item(id: i64, list_id: i64, name: Option<&str>) -> Item {
    Item::new(id, list_id, name.map(str::to_owned))
}

/// One scripted answer to `fetch_all`.
pub enum Step {
    Items(Vec<Item>),
    Fail(CoreError),
    /// Block until the sender resolves (or is dropped).
    Gate(oneshot::Receiver<Vec<Item>>),
    /// Panic inside `fetch_all`.
    Panic(&'static str),
}

/// An `ItemSource` that replays a queue of steps, then returns `[]`.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    /// Notified every time a fetch starts.
    pub started: Notify,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ItemSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<Item>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        self.started.notify_one();

        match step {
            None => Ok(Vec::new()),
            Some(Step::Items(items)) => Ok(items),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Gate(rx)) => rx.await.map_err(|_| CoreError::Network {
                message: "gate dropped".into(),
                status: None,
            }),
            Some(Step::Panic(msg)) => panic!("{msg}"),
        }
    }
}

/// Render groups the way the list screen lays them out.
pub fn render(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();
    for (key, items) in snapshot.groups.iter() {
        let _ = writeln!(out, "List ID: {key}");
        for item in items {
            let _ = writeln!(
                out,
                "  {} (ID: {})",
                item.name.as_deref().unwrap_or_default(),
                item.id
            );
        }
    }
    out.trim_end().to_owned()
}
