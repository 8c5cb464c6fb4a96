use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dragnet::app::AppContext;
use dragnet::cli::{commands, Cli, Commands};
use dragnet::config::Config;
use dragnet::platform::DiscoveryFilters;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let concurrency = cli.concurrency.unwrap_or(config.runtime.concurrency);
    if concurrency == 0 {
        anyhow::bail!("concurrency must be greater than zero");
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Hackerone {
            username,
            token,
            categories,
            bounty_only,
            private_only,
            public_only,
            active_only,
        } => {
            let options = commands::RunOptions {
                category_keyword: categories,
                filters: DiscoveryFilters {
                    bounty_only,
                    private_only,
                    public_only,
                    active_only,
                },
                concurrency,
                fields: cli.output,
                delimiter: cli.delimiter,
            };
            commands::hackerone(&ctx, &username, &token, &options).await?;
        }
        Commands::Bugcrowd {
            token,
            categories,
            bounty_only,
            private_only,
        } => {
            let options = commands::RunOptions {
                category_keyword: categories,
                filters: DiscoveryFilters {
                    bounty_only,
                    private_only,
                    ..Default::default()
                },
                concurrency,
                fields: cli.output,
                delimiter: cli.delimiter,
            };
            commands::bugcrowd(&ctx, &token, &options).await?;
        }
    }

    Ok(())
}
