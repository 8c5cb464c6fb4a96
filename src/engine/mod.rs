use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{DragnetError, Result};
use crate::fetcher::RateLimitedFetcher;
use crate::platform::{discover, DiscoveryFilters, Platform, Selection};
use crate::scope::{ProgramData, ProgramHandle};
use crate::session::Credential;

pub struct AggregateOptions {
    pub category_keyword: String,
    pub filters: DiscoveryFilters,
}

/// A program whose resolution failed; captured instead of aborting the run.
#[derive(Debug)]
pub struct ProgramFailure {
    pub handle: ProgramHandle,
    pub error: DragnetError,
}

/// All per-program records of one run. Order reflects completion, not
/// discovery. No further mutation happens after the scheduler's join point.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub programs: Vec<ProgramData>,
    pub failures: Vec<ProgramFailure>,
}

/// Bounded-concurrency scheduler: discovers every program handle up front,
/// then fans out scope resolution across at most `concurrency` tasks.
pub struct Aggregator {
    platform: Arc<dyn Platform>,
    fetcher: Arc<RateLimitedFetcher>,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(
        platform: Arc<dyn Platform>,
        fetcher: Arc<RateLimitedFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            platform,
            fetcher,
            concurrency,
        }
    }

    pub async fn run(
        &self,
        credential: &Credential,
        options: &AggregateOptions,
    ) -> Result<AggregateReport> {
        // Resolve the category keyword before any network traffic so a bad
        // keyword fails the run immediately.
        let selection = Arc::new(Selection {
            categories: self
                .platform
                .categories()
                .resolve(&options.category_keyword)?,
            bounty_only: options.filters.bounty_only,
        });

        tracing::debug!("Fetching list of program handles");
        let cursor = self.platform.cursor(options.filters);
        let handles = discover(&self.fetcher, credential, cursor).await?;
        tracing::info!(
            "Discovered {} programs on {}",
            handles.len(),
            self.platform.name()
        );

        tracing::debug!(
            "Fetching scope of each program. Concurrency: {}",
            self.concurrency
        );
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::new();

        for handle in handles {
            let platform = self.platform.clone();
            let fetcher = self.fetcher.clone();
            let credential = credential.clone();
            let selection = selection.clone();
            let semaphore = semaphore.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = platform
                    .resolve(&fetcher, &credential, &handle, &selection)
                    .await;
                (handle, result)
            }));
        }

        // Each task owns its result until it is merged here, at the join
        // point; the report is never touched by more than one task.
        let mut report = AggregateReport::default();
        for task in tasks {
            match task.await {
                Ok((_, Ok(data))) => report.programs.push(data),
                Ok((handle, Err(error))) => {
                    tracing::warn!("Failed to resolve scope of {}: {}", handle, error);
                    report.failures.push(ProgramFailure { handle, error });
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::RetryConfig;
    use crate::fetcher::testing::{ok, MockTransport};
    use crate::fetcher::RetryPolicy;
    use crate::platform::{CategoryTable, PageCursor};

    /// Platform whose listing is a single page of synthetic handles and whose
    /// resolution needs no network. Handles named `fail-*` error out.
    struct FakePlatform {
        categories: CategoryTable,
        program_count: usize,
    }

    impl FakePlatform {
        fn new(program_count: usize) -> Self {
            Self {
                categories: CategoryTable::new(&[("url", &["website"])]),
                program_count,
            }
        }
    }

    struct FakeCursor {
        remaining: Option<usize>,
    }

    impl PageCursor for FakeCursor {
        fn next_url(&self) -> Option<String> {
            self.remaining.map(|_| "https://platform.test/programs".to_string())
        }

        fn ingest(&mut self, _body: &str) -> crate::app::Result<Vec<ProgramHandle>> {
            let count = self.remaining.take().unwrap_or(0);
            Ok((0..count)
                .map(|i| ProgramHandle::new(format!("program-{}", i)))
                .collect())
        }
    }

    #[async_trait]
    impl Platform for FakePlatform {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn categories(&self) -> &CategoryTable {
            &self.categories
        }

        fn retry_policy(&self) -> RetryPolicy {
            RetryPolicy::Unbounded
        }

        fn cursor(&self, _filters: DiscoveryFilters) -> Box<dyn PageCursor> {
            Box::new(FakeCursor {
                remaining: Some(self.program_count),
            })
        }

        async fn resolve(
            &self,
            _fetcher: &RateLimitedFetcher,
            _credential: &Credential,
            handle: &ProgramHandle,
            _selection: &Selection,
        ) -> crate::app::Result<ProgramData> {
            if handle.as_str().starts_with("fail") {
                return Err(DragnetError::Other(format!("boom: {}", handle)));
            }
            Ok(ProgramData::new(format!("https://platform.test/{}", handle)))
        }
    }

    fn aggregator(platform: FakePlatform, concurrency: usize) -> Aggregator {
        let transport = Arc::new(MockTransport::new(|_, _| ok("{}")));
        let fetcher = Arc::new(RateLimitedFetcher::new(
            transport,
            RetryPolicy::Unbounded,
            &RetryConfig {
                rate_limit_backoff_secs: 0,
                transient_backoff_secs: 0,
                max_attempts: 50,
            },
        ));
        Aggregator::new(Arc::new(platform), fetcher, concurrency)
    }

    fn options(keyword: &str) -> AggregateOptions {
        AggregateOptions {
            category_keyword: keyword.to_string(),
            filters: DiscoveryFilters::default(),
        }
    }

    fn credential() -> Credential {
        Credential::session_cookie("session", "secret")
    }

    #[tokio::test]
    async fn test_no_program_is_lost_or_duplicated_under_concurrency() {
        let report = aggregator(FakePlatform::new(100), 8)
            .run(&credential(), &options("all"))
            .await
            .unwrap();

        assert_eq!(report.programs.len(), 100);
        assert!(report.failures.is_empty());

        let mut urls: Vec<&str> = report.programs.iter().map(|p| p.url.as_str()).collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), 100);
    }

    #[tokio::test]
    async fn test_unknown_category_fails_before_discovery() {
        let transport = Arc::new(MockTransport::new(|_, _| ok("{}")));
        let fetcher = Arc::new(RateLimitedFetcher::new(
            transport.clone(),
            RetryPolicy::Unbounded,
            &RetryConfig {
                rate_limit_backoff_secs: 0,
                transient_backoff_secs: 0,
                max_attempts: 50,
            },
        ));
        let aggregator = Aggregator::new(Arc::new(FakePlatform::new(5)), fetcher, 2);

        let err = aggregator
            .run(&credential(), &options("nonsense"))
            .await
            .unwrap_err();

        assert!(matches!(err, DragnetError::UnknownCategory(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_programs_are_reported_not_fatal() {
        // A listing that yields a mix of resolvable and failing handles.
        struct MixedCursor {
            drained: bool,
        }
        impl PageCursor for MixedCursor {
            fn next_url(&self) -> Option<String> {
                if self.drained {
                    None
                } else {
                    Some("https://platform.test/programs".to_string())
                }
            }
            fn ingest(&mut self, _body: &str) -> crate::app::Result<Vec<ProgramHandle>> {
                self.drained = true;
                Ok(vec![
                    ProgramHandle::new("program-0"),
                    ProgramHandle::new("fail-1"),
                    ProgramHandle::new("program-2"),
                ])
            }
        }

        struct MixedPlatform(FakePlatform);
        #[async_trait]
        impl Platform for MixedPlatform {
            fn name(&self) -> &'static str {
                self.0.name()
            }
            fn categories(&self) -> &CategoryTable {
                self.0.categories()
            }
            fn retry_policy(&self) -> RetryPolicy {
                self.0.retry_policy()
            }
            fn cursor(&self, _filters: DiscoveryFilters) -> Box<dyn PageCursor> {
                Box::new(MixedCursor { drained: false })
            }
            async fn resolve(
                &self,
                fetcher: &RateLimitedFetcher,
                credential: &Credential,
                handle: &ProgramHandle,
                selection: &Selection,
            ) -> crate::app::Result<ProgramData> {
                self.0.resolve(fetcher, credential, handle, selection).await
            }
        }

        let transport = Arc::new(MockTransport::new(|_, _| ok("{}")));
        let fetcher = Arc::new(RateLimitedFetcher::new(
            transport,
            RetryPolicy::Unbounded,
            &RetryConfig {
                rate_limit_backoff_secs: 0,
                transient_backoff_secs: 0,
                max_attempts: 50,
            },
        ));
        let aggregator =
            Aggregator::new(Arc::new(MixedPlatform(FakePlatform::new(0))), fetcher, 2);

        let report = aggregator
            .run(&credential(), &options("all"))
            .await
            .unwrap();

        assert_eq!(report.programs.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].handle.as_str(), "fail-1");
    }
}
