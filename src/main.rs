//! agrisense - crop recommendations from soil sensor readings.
//!
//! Sends a reading to the recommendation service, fills in seasonal rainfall
//! when the field kit has no rain gauge, and retries through DNS-over-HTTPS
//! when the network's resolver lets it down.

mod cli;
mod completions;
mod config;
mod dns;
mod http;
mod location;
mod output;
mod rainfall;
mod recommend;
mod validation;

use anyhow::Result;
use cli::{run, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Arguments first, so the log level is known before anything logs
    let args = Args::parse_flexible();

    let default_filter = if args.verbose { "agrisense=debug" } else { "agrisense=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(args).await
}
