use hookgate_core::network::DEFAULT_META_URL;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Startup configuration for the gate. Built once and shared read-only by
/// every request.
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Location of the repository store, re-read on every delivery.
    pub repos_path: PathBuf,
    /// Fixed trusted address or block; replaces the meta lookup when set.
    pub origin_override: Option<String>,
    /// Provider meta endpoint returning the `hooks` blocks.
    pub meta_url: String,
    pub meta_timeout: Duration,
    /// Surface error detail in rejection bodies.
    pub debug: bool,
}

impl GateSettings {
    pub fn new(repos_path: PathBuf) -> Self {
        Self {
            repos_path,
            origin_override: None,
            meta_url: DEFAULT_META_URL.to_string(),
            meta_timeout: Duration::from_secs(10),
            debug: false,
        }
    }

    /// Builder: trust only this address or block.
    pub fn with_origin_override(mut self, block: impl Into<String>) -> Self {
        self.origin_override = Some(block.into());
        self
    }

    /// Builder: fetch hook blocks from a different meta endpoint.
    pub fn with_meta_url(mut self, url: impl Into<String>) -> Self {
        self.meta_url = url.into();
        self
    }

    pub fn with_meta_timeout(mut self, timeout: Duration) -> Self {
        self.meta_timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<GateSettings>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(settings: GateSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hookgate/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.meta_timeout)
            .build()?;
        Ok(Self {
            settings: Arc::new(settings),
            http,
        })
    }
}
