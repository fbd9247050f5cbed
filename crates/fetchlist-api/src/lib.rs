// fetchlist-api: Async client for the remote item list endpoint.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_ENDPOINT, ItemsClient};
pub use error::Error;
pub use models::ItemResponse;
pub use transport::{TlsMode, TransportConfig};
