use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::engine::Aggregator;
use crate::fetcher::{HttpTransport, RateLimitedFetcher, Transport};
use crate::platform::Platform;

/// Wires the shared collaborators: configuration and the HTTP transport
/// every platform run reuses.
pub struct AppContext {
    pub config: Config,
    transport: Arc<dyn Transport + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport + Send + Sync> =
            Arc::new(HttpTransport::new(&config.http)?);
        Ok(Self { config, transport })
    }

    /// Build an aggregator for one platform, applying that platform's retry
    /// policy over the shared transport.
    pub fn aggregator(&self, platform: Arc<dyn Platform>, concurrency: usize) -> Aggregator {
        let fetcher = Arc::new(RateLimitedFetcher::new(
            self.transport.clone(),
            platform.retry_policy(),
            &self.config.retry,
        ));
        Aggregator::new(platform, fetcher, concurrency)
    }
}
