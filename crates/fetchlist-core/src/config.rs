// ── Runtime controller configuration ──
//
// Describes *where* items come from and *how* they are grouped.
// Core never reads config files: `fetchlist-config` (or a test)
// builds a `ControllerConfig` and hands it in.

use std::time::Duration;

use url::Url;

use crate::pipeline::Grouping;

pub use fetchlist_api::DEFAULT_ENDPOINT;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local test servers only).
    DangerAcceptInvalid,
}

/// Configuration for one item list controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Full URL of the JSON item collection.
    pub endpoint: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout, applied by the transport.
    pub timeout: Duration,
    /// Grouping key applied after filtering and sorting.
    pub grouping: Grouping,
    /// How often to refresh in the background (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl ControllerConfig {
    /// Config for `endpoint` with every other setting at its default.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            grouping: Grouping::default(),
            refresh_interval_secs: 0,
        }
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        #[allow(clippy::expect_used)]
        let endpoint = Url::parse(DEFAULT_ENDPOINT)
            .expect("default endpoint is a valid URL");
        Self::new(endpoint)
    }
}
