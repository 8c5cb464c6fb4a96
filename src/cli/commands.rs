use std::sync::Arc;

use crate::app::{AppContext, Result};
use crate::engine::AggregateOptions;
use crate::output;
use crate::platform::{bugcrowd, Bugcrowd, DiscoveryFilters, HackerOne, Platform};
use crate::session::Credential;

/// Everything a platform run needs beyond its credential.
pub struct RunOptions {
    pub category_keyword: String,
    pub filters: DiscoveryFilters,
    pub concurrency: usize,
    pub fields: String,
    pub delimiter: String,
}

pub async fn hackerone(
    ctx: &AppContext,
    username: &str,
    token: &str,
    options: &RunOptions,
) -> Result<()> {
    let platform = Arc::new(HackerOne::new(ctx.config.retry.max_attempts));
    let credential = Credential::basic(username, token);
    aggregate_and_print(ctx, platform, credential, options).await
}

pub async fn bugcrowd(ctx: &AppContext, token: &str, options: &RunOptions) -> Result<()> {
    let platform = Arc::new(Bugcrowd::new());
    let credential = Credential::session_cookie(bugcrowd::SESSION_COOKIE, token);
    aggregate_and_print(ctx, platform, credential, options).await
}

async fn aggregate_and_print(
    ctx: &AppContext,
    platform: Arc<dyn Platform>,
    credential: Credential,
    options: &RunOptions,
) -> Result<()> {
    // Output selection is configuration; reject it before touching the network.
    output::validate_fields(&options.fields)?;

    let aggregator = ctx.aggregator(platform, options.concurrency);
    let report = aggregator
        .run(
            &credential,
            &AggregateOptions {
                category_keyword: options.category_keyword.clone(),
                filters: options.filters,
            },
        )
        .await?;

    for program in &report.programs {
        output::print_program(program, &options.fields, &options.delimiter);
    }

    if !report.failures.is_empty() {
        eprintln!("{} programs failed to resolve:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.handle, failure.error);
        }
    }

    Ok(())
}
