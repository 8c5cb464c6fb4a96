use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::app::{DragnetError, Result};
use crate::config::RetryConfig;
use crate::fetcher::{FetchRequest, FetchResponse, Transport};

pub const RATE_LIMIT_STATUS: u16 = 429;

/// How many rate-limited attempts a request gets before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry on 429 forever.
    Unbounded,
    /// Fail after this many rate-limited attempts.
    Limited(u32),
}

/// Wraps a [`Transport`] with the platform's rate-limit retry discipline.
///
/// All network calls in the pipeline route through this type. A 429 sleeps
/// the rate-limit backoff and retries the same request, counting against the
/// policy's ceiling. Transport-level failures (DNS, connect, timeout) sleep
/// the shorter transient backoff and retry without consuming the ceiling.
/// Any other non-2xx status is terminal for the caller.
pub struct RateLimitedFetcher {
    transport: Arc<dyn Transport + Send + Sync>,
    policy: RetryPolicy,
    rate_limit_backoff: Duration,
    transient_backoff: Duration,
}

impl RateLimitedFetcher {
    pub fn new(
        transport: Arc<dyn Transport + Send + Sync>,
        policy: RetryPolicy,
        config: &RetryConfig,
    ) -> Self {
        Self {
            transport,
            policy,
            rate_limit_backoff: Duration::from_secs(config.rate_limit_backoff_secs),
            transient_backoff: Duration::from_secs(config.transient_backoff_secs),
        }
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let mut rate_limited_attempts: u32 = 0;

        loop {
            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("HTTP request to {} failed: {}, retrying", request.url, e);
                    sleep(self.transient_backoff).await;
                    continue;
                }
            };

            if response.status == RATE_LIMIT_STATUS {
                rate_limited_attempts += 1;
                if let RetryPolicy::Limited(max) = self.policy {
                    if rate_limited_attempts >= max {
                        return Err(DragnetError::RetriesExhausted {
                            url: request.url.clone(),
                            attempts: rate_limited_attempts,
                        });
                    }
                }
                tracing::warn!(
                    "Hit rate limiting (429) on {}, retrying in {:?}",
                    request.url,
                    self.rate_limit_backoff
                );
                sleep(self.rate_limit_backoff).await;
                continue;
            }

            if !response.is_success() {
                return Err(DragnetError::Status {
                    url: request.url.clone(),
                    status: response.status,
                });
            }

            return Ok(response);
        }
    }
}
